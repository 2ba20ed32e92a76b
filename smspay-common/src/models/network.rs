// File: smspay-common/src/models/network.rs
//
// Payloads of the eligibility / reporting service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Originating network of the handset: mobile country code and mobile network code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    pub mcc: String,
    pub mnc: String,
}

impl NetworkIdentity {
    pub fn new(mcc: impl Into<String>, mnc: impl Into<String>) -> Self {
        Self { mcc: mcc.into(), mnc: mnc.into() }
    }

    /// Home Network Identifier (MCC followed by MNC).
    pub fn hni(&self) -> String {
        format!("{}{}", self.mcc, self.mnc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HniStatus {
    Whitelisted,
    Blacklisted,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HniStatusResponse {
    pub status: HniStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceivedStatus {
    Yes,
    NotYet,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceivedStatusResponse {
    pub status: ReceivedStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub destination: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLogsBody {
    pub entries: Vec<LogEntry>,
    pub cli: String,
    pub cli_detail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostLogsResponse {
    #[serde(default)]
    pub ok: bool,
}

/// Query parameters of `received-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedStatusQuery {
    pub cli: String,
    pub ddi: String,
    pub r2: String,
    pub r3: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_fall_back() {
        let hni: HniStatusResponse = serde_json::from_str(r#"{"status":"greylisted"}"#).unwrap();
        assert_eq!(hni.status, HniStatus::Unknown);

        let rs: ReceivedStatusResponse = serde_json::from_str(r#"{"status":"not-yet"}"#).unwrap();
        assert_eq!(rs.status, ReceivedStatus::NotYet);

        let rs: ReceivedStatusResponse = serde_json::from_str(r#"{"status":"nope"}"#).unwrap();
        assert_eq!(rs.status, ReceivedStatus::Other);
    }

    #[test]
    fn hni_concatenates() {
        assert_eq!(NetworkIdentity::new("234", "15").hni(), "23415");
    }
}
