//! Dictionary error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching bytes over the network
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout, body read)
    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Errors surfaced by the resolver, installer and registry
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// A descriptor or dictionary download failed at the transport level
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(#[from] TransportError),

    /// A descriptor was found but none of its records serve the language
    #[error("Cannot find hyphenation dictionary for language {language}")]
    DictionaryNotFound { language: String },

    /// The locale has no entry in the registry
    #[error("Locale '{locale}' is not registered.\n\nTo install it, run:\n  hyphen install {locale}")]
    LocaleNotRegistered { locale: String },

    /// Reading or writing a registry document, lock or dictionary file failed
    #[error("Failed to access {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry document exists but cannot be parsed
    #[error("Failed to parse dictionary registry (corrupted or invalid format): {path}")]
    RegistryCorrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory registry could not be serialized
    #[error("Failed to serialize dictionary registry")]
    RegistrySerialize(#[source] serde_json::Error),

    /// A descriptor was fetched but is not well-formed XML
    #[error("Failed to parse dictionary descriptor from {url}")]
    InvalidDescriptor {
        url: String,
        #[source]
        source: roxmltree::Error,
    },
}

impl DictionaryError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DictionaryError::Persistence {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DictionaryError>;
