// src/network/rest_client.rs
//
// REST implementation of the eligibility / reporting service.

use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use smspay_common::models::network::{HniStatusResponse, PostLogsResponse, ReceivedStatusResponse};
use smspay_common::models::{HniStatus, PostLogsBody, ReceivedStatus, ReceivedStatusQuery};
use smspay_common::traits::api::EligibilityApi;

use crate::http::HttpClient;
use crate::Error;

/// Header carrying the SDK key on every request.
pub const SDK_KEY_HEADER: &str = "X-Sdk-Key";

pub struct RestEligibilityClient<H> {
    http: H,
    base: Url,
    sdk_key: String,
}

impl<H: HttpClient> RestEligibilityClient<H> {
    pub fn new(http: H, endpoint: &str, sdk_key: impl Into<String>) -> Result<Self, Error> {
        // `Url::join` drops the last path segment unless it ends with a slash.
        let mut base = Url::parse(endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            sdk_key: sdk_key.into(),
        })
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(SDK_KEY_HEADER.to_string(), self.sdk_key.clone());
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);
        self.http
            .get(url.to_string(), self.headers())
            .await
            .map_err(|e| {
                warn!("GET {} failed: {}", url, e);
                Error::Transport(e.to_string())
            })
    }
}

#[async_trait]
impl<H: HttpClient> EligibilityApi for RestEligibilityClient<H> {
    async fn get_hni_status(&self, mcc: &str, mnc: &str) -> Result<HniStatus, Error> {
        let url = self.url("hni-status", &[("mcc", mcc), ("mnc", mnc)])?;
        let body = self.get_text(url).await?;
        let parsed: HniStatusResponse = serde_json::from_str(&body)?;
        Ok(parsed.status)
    }

    async fn post_logs(&self, body: &PostLogsBody) -> Result<(), Error> {
        let url = self.url("logs", &[])?;
        let payload = serde_json::to_string(body)?;
        debug!("POST {} ({} entries)", url, body.entries.len());
        let text = self.http
            .post(url.to_string(), payload, self.headers())
            .await
            .map_err(|e| {
                warn!("POST {} failed: {}", url, e);
                Error::Transport(e.to_string())
            })?;
        let parsed: PostLogsResponse = serde_json::from_str(&text)?;
        if !parsed.ok {
            return Err(Error::Transport("log upload was not acknowledged".into()));
        }
        Ok(())
    }

    async fn get_received_status(&self, query: &ReceivedStatusQuery) -> Result<ReceivedStatus, Error> {
        let url = self.url(
            "received-status",
            &[
                ("cli", query.cli.as_str()),
                ("ddi", query.ddi.as_str()),
                ("r2", query.r2.as_str()),
                ("r3", query.r3.as_str()),
            ],
        )?;
        let body = self.get_text(url).await?;
        let parsed: ReceivedStatusResponse = serde_json::from_str(&body)?;
        Ok(parsed.status)
    }
}
