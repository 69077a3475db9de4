//! Network transport - Abstraction over HTTP GET
//!
//! The resolver and installer only ever need "give me the bytes at this URL".
//! Keeping that behind a trait lets tests substitute a recording mock.

use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;

/// Fetches the body of a URL
pub trait Transport: Send + Sync {
    /// GET `url` and return the response body
    ///
    /// Non-success HTTP statuses are errors.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        (**self).get(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        (**self).get(url)
    }
}

/// Blocking HTTP transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("hyphen/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let request_error = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}
