//! Hyphenation dictionaries - resolution, installation and registry
//!
//! This module provides functionality for locating hyphenation dictionaries
//! in a remote repository, downloading them, and tracking which locales are
//! installed in a local directory.
//!
//! # Overview
//!
//! - Resolve a locale (`en_US`, `de`) to a download URL via the repository's
//!   `dictionaries.xcu` descriptor, or guess the URL when none is published
//! - Install dictionaries into a directory, once per file
//! - Track installed locales in `dictionaries.json`; several locales may
//!   share one file
//!
//! # Architecture
//!
//! ```text
//! Repository (LibreOffice dictionaries)
//!     │
//!     ├── <ll_CC>/dictionaries.xcu  ← Lists dictionaries and their locales
//!     ├── <ll>/dictionaries.xcu     ← Fallback for country-less lookups
//!     └── <ll>/hyph_*.dic           ← Dictionary files
//!            │
//!            ▼
//!     Resolver → Installer
//!            │
//!            ▼
//!     <data dir>/hyph_<locale>.dic  ← Installed dictionaries
//!     <data dir>/dictionaries.json  ← Locale → file registry
//! ```

mod descriptor;
mod installer;
mod registry;
mod resolver;
mod transport;

pub use descriptor::{
    candidates, fetch_descriptor, parse_descriptor, Descriptor, DictionaryCandidate,
    HyphenationRecord, RecordMatcher, DESCRIPTOR_FILE,
};
pub use installer::Installer;
pub use registry::{Registry, RegistryEntry, REGISTRY_FILE};
pub use resolver::{resolve, Resolution, ResolvedDictionary};
pub use transport::{HttpTransport, Transport};

use std::path::{Path, PathBuf};

use crate::config::InstallerConfig;
use crate::error::Result;

fn config_for(directory: Option<&Path>) -> InstallerConfig {
    let mut config = InstallerConfig::default();
    if let Some(directory) = directory {
        config.directory = directory.to_path_buf();
    }
    config
}

fn registry_for(directory: Option<&Path>) -> Registry {
    Registry::new(config_for(directory).directory)
}

/// Install a dictionary unless it is already registered in `directory`
///
/// Returns the path of the installed file. `None` uses the default data directory.
pub fn install_if_necessary(language: &str, directory: Option<&Path>) -> Result<PathBuf> {
    Installer::new(config_for(directory))?.install_if_necessary(language)
}

/// Download and install a dictionary, replacing any previous installation
pub fn install(
    language: &str,
    directory: Option<&Path>,
    repository: Option<&str>,
    use_description: bool,
) -> Result<PathBuf> {
    let mut config = config_for(directory);
    if let Some(repository) = repository {
        config.set_repository(repository);
    }
    config.use_description = use_description;
    Installer::new(config)?.install(language)
}

/// Whether `language` is registered in `directory`
pub fn is_installed(language: &str, directory: Option<&Path>) -> Result<bool> {
    registry_for(directory).is_installed(language)
}

/// Remove the dictionary of `language` and every locale sharing its file
pub fn uninstall(language: &str, directory: Option<&Path>) -> Result<Vec<String>> {
    registry_for(directory).remove(language)
}

/// Sorted locales registered in `directory`
pub fn list_installed(directory: Option<&Path>) -> Result<Vec<String>> {
    registry_for(directory).installed_languages()
}
