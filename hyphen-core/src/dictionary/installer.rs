//! Dictionary installation
//!
//! Resolves a locale to a download URL, fetches the dictionary and records
//! it in the installation directory's registry.

use std::path::{Path, PathBuf};

use super::descriptor::{HyphenationRecord, RecordMatcher};
use super::registry::Registry;
use super::resolver::{resolve, Resolution, ResolvedDictionary};
use super::transport::{HttpTransport, Transport};
use crate::config::InstallerConfig;
use crate::error::Result;

/// Installer for hyphenation dictionaries
pub struct Installer {
    transport: Box<dyn Transport>,
    matcher: Box<dyn RecordMatcher>,
    config: InstallerConfig,
}

impl Installer {
    /// Create an installer that downloads over HTTP
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create an installer with a custom transport
    pub fn with_transport(config: InstallerConfig, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            matcher: Box::new(HyphenationRecord),
            config,
        }
    }

    /// Replace the descriptor record predicate
    pub fn with_matcher(mut self, matcher: impl RecordMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// The installation directory
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// A fresh registry view of the installation directory
    pub fn registry(&self) -> Registry {
        Registry::new(&self.config.directory)
    }

    fn guess(&self, language: &str) -> ResolvedDictionary {
        ResolvedDictionary {
            download_url: format!("{}hyph_dict_{}.dic", self.config.repository, language),
            locales: vec![language.to_string()],
        }
    }

    /// Work out where the dictionary for `language` would be downloaded from
    ///
    /// Falls back to a guessed URL when the repository publishes no descriptor
    /// or descriptors are disabled.
    pub fn resolve(&self, language: &str) -> Result<ResolvedDictionary> {
        if !self.config.use_description {
            return Ok(self.guess(language));
        }

        match resolve(
            self.transport.as_ref(),
            self.matcher.as_ref(),
            &self.config.repository,
            language,
        )? {
            Resolution::Found(resolved) => Ok(resolved),
            Resolution::NoMetadata => {
                tracing::debug!("No descriptor for {}, guessing dictionary URL", language);
                Ok(self.guess(language))
            }
        }
    }

    /// Download and install the dictionary for `language`
    ///
    /// Always downloads, replacing any previously installed file of the same name.
    pub fn install(&self, language: &str) -> Result<PathBuf> {
        let resolved = self.resolve(language)?;

        tracing::info!("Downloading {} from {}", language, resolved.download_url);
        let content = self.transport.get(&resolved.download_url)?;

        let path = self.registry().add(
            language,
            &content,
            &resolved.locales,
            &resolved.download_url,
        )?;

        tracing::info!("Installed {} to {}", language, path.display());
        Ok(path)
    }

    /// Install `language` unless it is already registered
    pub fn install_if_necessary(&self, language: &str) -> Result<PathBuf> {
        let mut registry = self.registry();

        if registry.is_installed(language)? {
            tracing::debug!("{} already installed", language);
            return registry.filepath(language);
        }

        self.install(language)?;
        registry.reload();
        registry.filepath(language)
    }

    /// Remove `language` and every locale sharing its file
    pub fn uninstall(&self, language: &str) -> Result<Vec<String>> {
        let removed = self.registry().remove(language)?;
        if !removed.is_empty() {
            tracing::info!("Uninstalled {}", removed.join(", "));
        }
        Ok(removed)
    }

    /// Whether `language` is registered
    pub fn is_installed(&self, language: &str) -> Result<bool> {
        self.registry().is_installed(language)
    }

    /// Sorted list of registered locales
    pub fn list_installed(&self) -> Result<Vec<String>> {
        self.registry().installed_languages()
    }
}
