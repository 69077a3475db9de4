//! Hyphen library exports

pub mod config;
pub mod dictionary;
pub mod error;

pub use config::InstallerConfig;
pub use dictionary::{
    install, install_if_necessary, is_installed, list_installed, uninstall, Installer, Registry,
};
pub use error::{DictionaryError, Result, TransportError};
