//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use hyphen_core::dictionary::Transport;
use hyphen_core::{InstallerConfig, TransportError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, Once};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Repository base URL served by [`MockRepository`]
pub const REPO: &str = "http://dictionaries.test/plain/";

/// In-memory dictionary repository that records requested URLs
#[derive(Default)]
pub struct MockRepository {
    files: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `REPO` + `path`
    pub fn serve(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.files.insert(format!("{REPO}{path}"), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockRepository {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Installer config pointing at `directory` and the mock repository
pub fn test_config(directory: &Path) -> InstallerConfig {
    InstallerConfig {
        directory: directory.to_path_buf(),
        repository: REPO.to_string(),
        ..Default::default()
    }
}

/// Build a `dictionaries.xcu` with one hyphenation record per `(location, locales)`
pub fn descriptor(records: &[(&str, &str)]) -> String {
    let nodes: String = records
        .iter()
        .enumerate()
        .map(|(i, (location, locales))| {
            format!(
                r#"      <node oor:name="HyphDic_{i}" oor:op="fuse">
        <prop oor:name="Locations" oor:type="oor:string-list"><value>{location}</value></prop>
        <prop oor:name="Format" oor:type="xs:string"><value>DICT_HYPH</value></prop>
        <prop oor:name="Locales" oor:type="oor:string-list"><value>{locales}</value></prop>
      </node>
"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<oor:component-data xmlns:oor="http://openoffice.org/2001/registry" oor:name="Linguistic" oor:package="org.openoffice.Office">
  <node oor:name="ServiceManager">
    <node oor:name="Dictionaries">
{nodes}    </node>
  </node>
</oor:component-data>
"#
    )
}
