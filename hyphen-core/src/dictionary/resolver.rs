//! Locale → download URL resolution
//!
//! Looks for a descriptor under `<repository><language>` first and, for
//! country-qualified locales, under `<repository><ll>` second. A descriptor
//! that exists but has no record for the locale is a hard failure; no
//! descriptor at all lets the caller guess.

use super::descriptor::{fetch_descriptor, RecordMatcher};
use super::transport::Transport;
use crate::error::{DictionaryError, Result};

/// A concrete dictionary download and the locales it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDictionary {
    pub download_url: String,
    pub locales: Vec<String>,
}

/// Outcome of a descriptor lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A descriptor record serves the language
    Found(ResolvedDictionary),
    /// No descriptor could be fetched at either location
    NoMetadata,
}

/// Resolve `language` against the descriptors published in `repository`
pub fn resolve(
    transport: &dyn Transport,
    matcher: &dyn RecordMatcher,
    repository: &str,
    language: &str,
) -> Result<Resolution> {
    let mut descriptor = fetch_descriptor(transport, &format!("{repository}{language}"));

    if descriptor.is_none() && language.chars().count() > 2 {
        let base: String = language.chars().take(2).collect();
        tracing::debug!("No descriptor for {}, trying {}", language, base);
        descriptor = fetch_descriptor(transport, &format!("{repository}{base}"));
    }

    let Some(descriptor) = descriptor else {
        return Ok(Resolution::NoMetadata);
    };

    match descriptor.find(language, matcher)? {
        Some(resolved) => Ok(Resolution::Found(resolved)),
        None => Err(DictionaryError::DictionaryNotFound {
            language: language.to_string(),
        }),
    }
}
