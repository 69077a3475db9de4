//! Installed dictionary registry (`dictionaries.json`)
//!
//! Maps locales to the dictionary files installed in a directory. Several
//! locales may share one file; such a group is installed and removed as a
//! unit.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{DictionaryError, Result};

/// Registry document name inside the installation directory
pub const REGISTRY_FILE: &str = "dictionaries.json";

/// Advisory lock held while the registry document is rewritten
const LOCK_FILE: &str = "dictionaries.lock";

/// An installed locale binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Dictionary filename, relative to the installation directory
    pub file: String,
    /// Where the dictionary was downloaded from
    #[serde(rename = "url")]
    pub source_url: String,
}

/// The locale → file mapping for one installation directory
///
/// Loaded lazily on first access. Mutations are persisted by [`Registry::save`],
/// which `add` and `remove` call themselves.
#[derive(Debug)]
pub struct Registry {
    directory: PathBuf,
    entries: Option<BTreeMap<String, RegistryEntry>>,
}

impl Registry {
    /// Create a registry for `directory` without touching the disk
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            entries: None,
        }
    }

    /// The installation directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the persisted registry document
    pub fn document_path(&self) -> PathBuf {
        self.directory.join(REGISTRY_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.directory.join(LOCK_FILE)
    }

    /// Deterministic filename for a locale's dictionary
    fn filename_for(locale: &str) -> String {
        format!("hyph_{locale}.dic")
    }

    fn read_document(path: &Path) -> Result<BTreeMap<String, RegistryEntry>> {
        if !path.exists() {
            tracing::debug!("No registry at {}, starting empty", path.display());
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|source| DictionaryError::persistence(path, source))?;

        let entries = serde_json::from_str(&content).map_err(|source| {
            DictionaryError::RegistryCorrupted {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::debug!("Loaded registry from {}", path.display());
        Ok(entries)
    }

    fn entries_mut(&mut self) -> Result<&mut BTreeMap<String, RegistryEntry>> {
        if self.entries.is_none() {
            self.entries = Some(Self::read_document(&self.document_path())?);
        }
        Ok(self.entries.get_or_insert_with(BTreeMap::new))
    }

    /// Whether `locale` has an entry
    pub fn is_installed(&mut self, locale: &str) -> Result<bool> {
        Ok(self.entries_mut()?.contains_key(locale))
    }

    /// All registered locales, sorted
    pub fn installed_languages(&mut self) -> Result<Vec<String>> {
        Ok(self.entries_mut()?.keys().cloned().collect())
    }

    /// The entry registered for `locale`, if any
    pub fn entry(&mut self, locale: &str) -> Result<Option<RegistryEntry>> {
        Ok(self.entries_mut()?.get(locale).cloned())
    }

    /// All entries, sorted by locale
    pub fn entries(&mut self) -> Result<Vec<(String, RegistryEntry)>> {
        Ok(self
            .entries_mut()?
            .iter()
            .map(|(locale, entry)| (locale.clone(), entry.clone()))
            .collect())
    }

    /// Locales bound to `file`, sorted
    pub fn locales_for_file(&mut self, file: &str) -> Result<Vec<String>> {
        Ok(self
            .entries_mut()?
            .iter()
            .filter(|(_, entry)| entry.file == file)
            .map(|(locale, _)| locale.clone())
            .collect())
    }

    /// Absolute path of the dictionary installed for `locale`
    pub fn filepath(&mut self, locale: &str) -> Result<PathBuf> {
        let file = self
            .entries_mut()?
            .get(locale)
            .map(|entry| entry.file.clone())
            .ok_or_else(|| DictionaryError::LocaleNotRegistered {
                locale: locale.to_string(),
            })?;

        Ok(self.directory.join(file))
    }

    /// Write a dictionary file and register it under every associated locale
    ///
    /// The file is named `hyph_<locale>.dic` and overwrites any existing file
    /// of that name. `locale` is always registered, even if `locales` omits it.
    /// Files left without any locale by the rebinding are deleted.
    pub fn add(
        &mut self,
        locale: &str,
        content: &[u8],
        locales: &[String],
        source_url: &str,
    ) -> Result<PathBuf> {
        let filename = Self::filename_for(locale);
        let filepath = self.directory.join(&filename);
        let targets: Vec<&str> = locales
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(locale))
            .collect();

        let stranded = self.update(|entries| {
            // Document already parsed; a corrupt registry fails before the file is written
            std::fs::write(&filepath, content)
                .map_err(|source| DictionaryError::persistence(&filepath, source))?;

            let previous: BTreeSet<String> = targets
                .iter()
                .filter_map(|target| entries.get(*target))
                .map(|entry| entry.file.clone())
                .filter(|file| *file != filename)
                .collect();

            for target in &targets {
                entries.insert(
                    target.to_string(),
                    RegistryEntry {
                        file: filename.clone(),
                        source_url: source_url.to_string(),
                    },
                );
            }

            let stranded: Vec<String> = previous
                .into_iter()
                .filter(|file| !entries.values().any(|entry| entry.file == *file))
                .collect();
            Ok(Some(stranded))
        })?;

        for file in stranded.unwrap_or_default() {
            tracing::info!("Removing dictionary no longer referenced: {}", file);
            self.delete_file(&file)?;
        }

        Ok(filepath)
    }

    /// Remove `locale` together with every locale sharing its file
    ///
    /// The file is deleted once, after the registry no longer references it.
    /// Unknown locales are a no-op. Returns the removed locales.
    pub fn remove(&mut self, locale: &str) -> Result<Vec<String>> {
        if !self.is_installed(locale)? {
            return Ok(Vec::new());
        }

        let removed = self.update(|entries| {
            let Some(file) = entries.get(locale).map(|entry| entry.file.clone()) else {
                return Ok(None);
            };

            let group: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.file == file)
                .map(|(member, _)| member.clone())
                .collect();
            for member in &group {
                entries.remove(member);
            }
            Ok(Some((file, group)))
        })?;

        let Some((file, group)) = removed else {
            return Ok(Vec::new());
        };
        self.delete_file(&file)?;

        Ok(group)
    }

    /// Delete a dictionary file named by a registry entry
    ///
    /// Only plain filenames inside the installation directory are touched.
    fn delete_file(&self, file: &str) -> Result<()> {
        let mut components = Path::new(file).components();
        let is_plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_plain_name {
            tracing::warn!(
                "Refusing to delete dictionary outside {}: {}",
                self.directory.display(),
                file
            );
            return Ok(());
        }

        let filepath = self.directory.join(file);
        if filepath.exists() {
            std::fs::remove_file(&filepath)
                .map_err(|source| DictionaryError::persistence(&filepath, source))?;
        } else {
            tracing::warn!("Dictionary file already missing: {}", filepath.display());
        }
        Ok(())
    }

    /// Persist the mapping, creating the installation directory if needed
    ///
    /// The document is replaced atomically while holding `dictionaries.lock`.
    pub fn save(&mut self) -> Result<()> {
        let entries = self.entries_mut()?.clone();

        let lock_file = self.lock()?;
        let result = self.write_document(&entries);

        let _ = lock_file.unlock();
        result
    }

    /// Re-read, modify and write the document under one lock
    ///
    /// `apply` returns `None` when it changed nothing; the document is then
    /// left untouched. In-memory state is replaced by what was written.
    fn update<T>(
        &mut self,
        apply: impl FnOnce(&mut BTreeMap<String, RegistryEntry>) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let lock_file = self.lock()?;

        let result = Self::read_document(&self.document_path()).and_then(|mut entries| {
            let value = apply(&mut entries)?;
            if value.is_some() {
                self.write_document(&entries)?;
            }
            Ok((entries, value))
        });

        let _ = lock_file.unlock();

        let (entries, value) = result?;
        self.entries = Some(entries);
        Ok(value)
    }

    fn lock(&self) -> Result<File> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|source| DictionaryError::persistence(&self.directory, source))?;

        let lock_path = self.lock_path();
        let lock_file = File::create(&lock_path)
            .map_err(|source| DictionaryError::persistence(&lock_path, source))?;
        lock_file
            .lock_exclusive()
            .map_err(|source| DictionaryError::persistence(&lock_path, source))?;

        Ok(lock_file)
    }

    fn write_document(&self, entries: &BTreeMap<String, RegistryEntry>) -> Result<()> {
        let path = self.document_path();
        let content =
            serde_json::to_string_pretty(entries).map_err(DictionaryError::RegistrySerialize)?;

        let mut temp = tempfile::NamedTempFile::new_in(&self.directory)
            .map_err(|source| DictionaryError::persistence(&self.directory, source))?;
        temp.write_all(content.as_bytes())
            .map_err(|source| DictionaryError::persistence(temp.path(), source))?;
        temp.persist(&path)
            .map_err(|e| DictionaryError::persistence(&path, e.error))?;

        tracing::debug!("Saved registry to {}", path.display());
        Ok(())
    }

    /// Drop in-memory state; the next access re-reads the document
    pub fn reload(&mut self) {
        self.entries = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn locales(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_missing_document_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path().join("never-created"));

        assert!(!registry.is_installed("en_US").unwrap());
        assert!(registry.installed_languages().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_filepath_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        let content = b"ISO8859-1\n.a1b\n";

        let path = registry
            .add("de_DE", content, &locales(&["de_DE"]), "http://repo/de/hyph_de_DE.dic")
            .unwrap();

        assert_eq!(path, temp_dir.path().join("hyph_de_DE.dic"));
        assert_eq!(registry.filepath("de_DE").unwrap(), path);
        assert_eq!(std::fs::read(&path).unwrap(), content);
    }

    #[test]
    fn test_add_registers_all_locales() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());

        registry
            .add("en_US", b"x", &locales(&["en_US", "en_GB", "en_ZA"]), "http://repo/en")
            .unwrap();

        assert_eq!(
            registry.installed_languages().unwrap(),
            locales(&["en_GB", "en_US", "en_ZA"])
        );
        assert_eq!(
            registry.locales_for_file("hyph_en_US.dic").unwrap(),
            locales(&["en_GB", "en_US", "en_ZA"])
        );
    }

    #[test]
    fn test_add_always_registers_requested_locale() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());

        registry.add("nl", b"x", &[], "http://repo/hyph_dict_nl.dic").unwrap();

        assert!(registry.is_installed("nl").unwrap());
    }

    #[test]
    fn test_filepath_unknown_locale() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());

        let err = registry.filepath("xx_XX").unwrap_err();
        assert!(matches!(
            err,
            DictionaryError::LocaleNotRegistered { ref locale } if locale == "xx_XX"
        ));
    }

    #[test]
    fn test_remove_shared_file_removes_group() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        let path = registry
            .add("en_US", b"x", &locales(&["en_US", "en_GB"]), "http://repo/en")
            .unwrap();

        let removed = registry.remove("en_GB").unwrap();

        assert_eq!(removed, locales(&["en_GB", "en_US"]));
        assert!(!registry.is_installed("en_US").unwrap());
        assert!(!registry.is_installed("en_GB").unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_leaves_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        registry.add("fr_FR", b"fr", &locales(&["fr_FR"]), "u1").unwrap();
        let de_path = registry.add("de_DE", b"de", &locales(&["de_DE"]), "u2").unwrap();

        registry.remove("fr_FR").unwrap();

        assert_eq!(registry.installed_languages().unwrap(), locales(&["de_DE"]));
        assert!(de_path.exists());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());

        assert!(registry.remove("xx").unwrap().is_empty());
        assert!(!registry.document_path().exists());
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        let path = registry.add("it_IT", b"x", &locales(&["it_IT"]), "u").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(registry.remove("it_IT").unwrap(), locales(&["it_IT"]));
        assert!(!registry.is_installed("it_IT").unwrap());
    }

    #[test]
    fn test_document_format() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        registry
            .add("en_US", b"x", &locales(&["en_US", "en_GB"]), "http://repo/en/hyph_en_US.dic")
            .unwrap();

        let content = std::fs::read_to_string(registry.document_path()).unwrap();
        let expected = r#"{
  "en_GB": {
    "file": "hyph_en_US.dic",
    "url": "http://repo/en/hyph_en_US.dic"
  },
  "en_US": {
    "file": "hyph_en_US.dic",
    "url": "http://repo/en/hyph_en_US.dic"
  }
}"#;
        assert_eq!(content, expected);
    }

    #[test]
    fn test_reload_observes_external_changes() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = Registry::new(temp_dir.path());
        let mut second = Registry::new(temp_dir.path());
        assert!(!second.is_installed("sv").unwrap());

        first.add("sv", b"x", &locales(&["sv"]), "u").unwrap();

        // Cached state is stale until reloaded
        assert!(!second.is_installed("sv").unwrap());
        second.reload();
        assert!(second.is_installed("sv").unwrap());
    }

    #[test]
    fn test_save_reads_through_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        Registry::new(temp_dir.path())
            .add("pl_PL", b"x", &locales(&["pl_PL"]), "u")
            .unwrap();

        // A fresh instance that never loaded must not clobber the document
        let mut fresh = Registry::new(temp_dir.path());
        fresh.save().unwrap();
        fresh.reload();

        assert!(fresh.is_installed("pl_PL").unwrap());
    }

    #[test]
    fn test_add_to_corrupt_document_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(REGISTRY_FILE), "{ not json").unwrap();
        let mut registry = Registry::new(temp_dir.path());

        let err = registry.add("x", b"c", &[], "u").unwrap_err();

        assert!(matches!(err, DictionaryError::RegistryCorrupted { .. }));
        assert!(!temp_dir.path().join("hyph_x.dic").exists());
    }

    #[test]
    fn test_stale_instance_keeps_concurrent_additions() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = Registry::new(temp_dir.path());
        let mut second = Registry::new(temp_dir.path());
        assert!(second.installed_languages().unwrap().is_empty());

        first.add("fi", b"fi", &locales(&["fi"]), "u1").unwrap();
        second.add("et", b"et", &locales(&["et"]), "u2").unwrap();

        assert_eq!(second.installed_languages().unwrap(), locales(&["et", "fi"]));
        first.reload();
        assert_eq!(first.installed_languages().unwrap(), locales(&["et", "fi"]));
    }

    #[test]
    fn test_rebinding_group_deletes_unreferenced_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        let old_path = registry
            .add("en_US", b"old", &locales(&["en_US", "en_GB"]), "u1")
            .unwrap();

        let new_path = registry
            .add("en_GB", b"new", &locales(&["en_US", "en_GB"]), "u2")
            .unwrap();

        assert!(!old_path.exists());
        assert!(new_path.exists());
        assert_eq!(
            registry.locales_for_file("hyph_en_GB.dic").unwrap(),
            locales(&["en_GB", "en_US"])
        );
    }

    #[test]
    fn test_partial_rebinding_keeps_referenced_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Registry::new(temp_dir.path());
        let old_path = registry
            .add("en_US", b"old", &locales(&["en_US", "en_GB"]), "u1")
            .unwrap();

        registry.add("en_GB", b"new", &locales(&["en_GB"]), "u2").unwrap();

        assert!(old_path.exists());
        assert_eq!(registry.filepath("en_US").unwrap(), old_path);
    }

    #[test]
    fn test_remove_never_deletes_outside_directory() {
        let temp_dir = TempDir::new().unwrap();
        let install_dir = temp_dir.path().join("dicts");
        std::fs::create_dir_all(&install_dir).unwrap();
        let outside = temp_dir.path().join("precious.txt");
        std::fs::write(&outside, "keep").unwrap();
        std::fs::write(
            install_dir.join(REGISTRY_FILE),
            r#"{"xx": {"file": "../precious.txt", "url": "u"}}"#,
        )
        .unwrap();
        let mut registry = Registry::new(&install_dir);

        assert_eq!(registry.remove("xx").unwrap(), locales(&["xx"]));

        assert!(outside.exists());
        assert!(!registry.is_installed("xx").unwrap());
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(REGISTRY_FILE), "{ not json").unwrap();
        let mut registry = Registry::new(temp_dir.path());

        let err = registry.is_installed("en_US").unwrap_err();
        assert!(matches!(err, DictionaryError::RegistryCorrupted { .. }));
    }
}
