// File: smspay-core/tests/rest_client_tests.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;
use url::Url;

use smspay_common::models::{HniStatus, LogEntry, PostLogsBody, ReceivedStatus, ReceivedStatusQuery};
use smspay_common::traits::api::EligibilityApi;
use smspay_core::network::{RestEligibilityClient, SDK_KEY_HEADER};
use smspay_core::{Error, HttpClient};

mock! {
    pub Http {}
    #[async_trait]
    impl HttpClient for Http {
        type Error = Error;
        async fn post(&self, url: String, body: String, headers: HashMap<String, String>) -> Result<String, Error>;
        async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Error>;
    }
}

fn query_of(url: &str) -> HashMap<String, String> {
    Url::parse(url)
        .map(|u| u.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn hni_status_sends_network_and_key() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_get()
        .withf(|url, headers| {
            let q = query_of(url);
            url.starts_with("https://api.example.test/v1/hni-status?")
                && q.get("mcc").map(String::as_str) == Some("234")
                && q.get("mnc").map(String::as_str) == Some("15")
                && headers.get(SDK_KEY_HEADER).map(String::as_str) == Some("key-1")
        })
        .times(1)
        .returning(|_, _| Ok(r#"{"status":"whitelisted"}"#.to_string()));

    // No trailing slash: the last path segment must survive the join.
    let client = RestEligibilityClient::new(http, "https://api.example.test/v1", "key-1")?;
    assert_eq!(client.get_hni_status("234", "15").await?, HniStatus::Whitelisted);
    Ok(())
}

#[tokio::test]
async fn unrecognised_hni_status_is_unknown() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_get()
        .returning(|_, _| Ok(r#"{"status":"greylisted"}"#.to_string()));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    assert_eq!(client.get_hni_status("1", "2").await?, HniStatus::Unknown);
    Ok(())
}

#[tokio::test]
async fn http_failures_become_transport_errors() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_get()
        .returning(|_, _| Err(Error::Io(std::io::Error::other("connection reset"))));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    let err = client.get_hni_status("234", "15").await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_an_error() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_get().returning(|_, _| Ok("<html>".to_string()));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    assert!(matches!(client.get_hni_status("234", "15").await, Err(Error::Json(_))));
    Ok(())
}

#[tokio::test]
async fn post_logs_serialises_entries() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_post()
        .withf(|url, body, headers| {
            let parsed: Result<PostLogsBody, _> = serde_json::from_str(body);
            url == "https://api.example.test/v1/logs"
                && headers.contains_key(SDK_KEY_HEADER)
                && parsed.is_ok_and(|b| b.entries.len() == 1 && b.cli_detail == "23415")
        })
        .times(1)
        .returning(|_, _, _| Ok(r#"{"ok":true}"#.to_string()));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    let body = PostLogsBody {
        entries: vec![LogEntry {
            destination: "447700900123".into(),
            message: "P1 1/3".into(),
            sent_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }],
        cli: "SMSPAY".into(),
        cli_detail: "23415".into(),
    };
    client.post_logs(&body).await?;
    Ok(())
}

#[tokio::test]
async fn unacknowledged_log_upload_fails() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_post()
        .returning(|_, _, _| Ok(r#"{"ok":false}"#.to_string()));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    let body = PostLogsBody {
        entries: vec![],
        cli: String::new(),
        cli_detail: String::new(),
    };
    assert!(client.post_logs(&body).await.is_err());
    Ok(())
}

#[tokio::test]
async fn received_status_passes_counters() -> Result<(), Error> {
    let mut http = MockHttp::new();
    http.expect_get()
        .withf(|url, _| {
            let q = query_of(url);
            url.starts_with("https://api.example.test/v1/received-status?")
                && q.get("cli").map(String::as_str) == Some("SMSPAY")
                && q.get("ddi").map(String::as_str) == Some("447700900123")
                && q.get("r2").map(String::as_str) == Some("2")
                && q.get("r3").map(String::as_str) == Some("3")
        })
        .times(1)
        .returning(|_, _| Ok(r#"{"status":"not-yet"}"#.to_string()));

    let client = RestEligibilityClient::new(http, "https://api.example.test/v1/", "k")?;
    let query = ReceivedStatusQuery {
        cli: "SMSPAY".into(),
        ddi: "447700900123".into(),
        r2: "2".into(),
        r3: "3".into(),
    };
    assert_eq!(client.get_received_status(&query).await?, ReceivedStatus::NotYet);
    Ok(())
}
