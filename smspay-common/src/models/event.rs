// File: smspay-common/src/models/event.rs

use serde::{Deserialize, Serialize};

/// Everything the purchase driver tells the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PurchaseEvent {
    /// `sent_count` is only present on step boundaries; pacing ticks carry the percentage alone.
    Progress {
        #[serde(skip_serializing_if = "Option::is_none")]
        sent_count: Option<u32>,
        percent: u8,
    },
    SmsError { message: String },
    Cancelled { product_id: String },
    Completed,
    NoConnection,
    Unsupported,
    /// The progress store failed; the purchase was abandoned.
    Failed { message: String },
}

impl PurchaseEvent {
    pub fn progress(sent_count: u32, percent: u8) -> Self {
        PurchaseEvent::Progress {
            sent_count: Some(sent_count),
            percent,
        }
    }

    pub fn percent(percent: u8) -> Self {
        PurchaseEvent::Progress {
            sent_count: None,
            percent,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            PurchaseEvent::Progress { .. } => "progress",
            PurchaseEvent::SmsError { .. } => "sms_error",
            PurchaseEvent::Cancelled { .. } => "cancelled",
            PurchaseEvent::Completed => "completed",
            PurchaseEvent::NoConnection => "no_connection",
            PurchaseEvent::Unsupported => "unsupported",
            PurchaseEvent::Failed { .. } => "failed",
        }
    }

    /// Terminal events end the purchase; nothing else is published for it afterwards.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            PurchaseEvent::Progress { .. } | PurchaseEvent::SmsError { .. }
        )
    }
}
