use std::sync::Arc;
use crate::error::Error;
use crate::models::{DeliveryResult, OutgoingSms, Product, SentResult};

/// Receives the asynchronous outcome of one submission.
///
/// Implementations must be callable from any thread, any number of times.
pub trait DeliveryReporter: Send + Sync {
    fn sent(&self, result: SentResult);
    fn delivered(&self, result: DeliveryResult);
}

/// Hands SMS to whatever actually transmits them.
pub trait SmsTransmitter: Send + Sync {
    /// Returns `Err` only when the submission is refused outright. Otherwise the
    /// reporter will eventually be told about `sent` and, usually, `delivered`.
    fn submit(&self, sms: &OutgoingSms, reporter: Arc<dyn DeliveryReporter>) -> Result<(), Error>;
}

pub trait ProductCatalogue: Send + Sync {
    fn product(&self, product_id: &str) -> Option<Product>;
    fn products(&self) -> Vec<Product>;
}

/// Produces the body of the `index`-th message out of `total` for a product.
pub trait MessageGenerator: Send + Sync {
    fn generate(&self, product: &Product, total: u32, index: u32) -> String;
}

/// Source of pacing intervals, in whole seconds, each at least 1.
pub trait IntervalSource: Send + Sync {
    fn next_interval(&mut self) -> u32;
}
