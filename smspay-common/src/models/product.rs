// File: smspay-common/src/models/product.rs

use serde::{Deserialize, Serialize};

/// A purchasable product. Immutable for the lifetime of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    /// How many SMS must be confirmed delivered before the product is redeemed.
    pub required_sms_count: u32,
}

impl Product {
    pub fn new(product_id: impl Into<String>, required_sms_count: u32) -> Self {
        Self {
            product_id: product_id.into(),
            required_sms_count,
        }
    }
}
