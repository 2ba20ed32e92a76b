// File: smspay-common/src/models/sms.rs

use serde::{Deserialize, Serialize};

/// One message handed to the transmitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingSms {
    pub destination: String,
    pub body: String,
    /// Zero-based position of this message within the purchase.
    pub index: u32,
}

/// Outcome of the "sent" callback from the radio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentResult {
    Ok,
    GenericFailure,
    NoService,
    NullPdu,
    RadioOff,
}

impl SentResult {
    /// User-facing text for a failed send, `None` when the send succeeded.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            SentResult::Ok => None,
            SentResult::GenericFailure => Some("generic failure"),
            SentResult::NoService => Some("no service"),
            SentResult::NullPdu => Some("null pdu"),
            SentResult::RadioOff => Some("radio off"),
        }
    }
}

/// Outcome of the "delivered" callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryResult {
    Ok,
    Cancelled,
}

pub const DELIVERY_FAILED_MESSAGE: &str = "SMS delivery failed";
