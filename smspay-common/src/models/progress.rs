// File: smspay-common/src/models/progress.rs

use serde::{Deserialize, Serialize};

/// Durable purchase progress for one product.
///
/// `sent_count` only ever grows, and `redeemed` never goes back to false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub product_id: String,
    pub sent_count: u32,
    /// Total SMS count recorded when the purchase was first started.
    pub total_count: Option<u32>,
    pub cancelled: bool,
    pub redeemed: bool,
}

impl ProgressRecord {
    pub fn empty(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            ..Default::default()
        }
    }
}

/// Flat key names used by key/value backed progress stores.
pub mod keys {
    pub fn sent_count(product_id: &str) -> String {
        format!("sent_count:{product_id}")
    }

    pub fn total(product_id: &str) -> String {
        format!("total:{product_id}")
    }

    pub fn cancelled(product_id: &str) -> String {
        format!("cancelled:{product_id}")
    }
}
