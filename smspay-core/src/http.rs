//! HTTP Client abstraction layer for the eligibility service
//!
//! The REST client only ever talks to this trait, which lets tests script
//! responses without a real network. The default implementation wraps reqwest.
//!
//! # Example Usage:
//! ``
//! use crate::http::{HttpClient, DefaultHttpClient};
//!
//! let client = DefaultHttpClient::with_timeout(Duration::from_secs(30))?;
//! let body = client.get(url, headers).await?;
//! ``

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use crate::Error;

/// A generic trait for making HTTP requests.
///
/// Non-success status codes are reported as `Err`, so callers only see bodies
/// of successful responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn post(&self, url: String, body: String, headers: HashMap<String, String>) -> Result<String, Self::Error>;
    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Self::Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl Default for DefaultHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    type Error = Error;

    async fn post(&self, url: String, body: String, headers: HashMap<String, String>) -> Result<String, Self::Error> {
        let mut request = self.client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(response)
    }

    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Self::Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(response)
    }
}
