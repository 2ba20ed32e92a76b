use async_trait::async_trait;
use crate::error::Error;
use crate::models::ProgressRecord;

/// Durable per-product purchase progress.
///
/// Every write must be durable before the future resolves. Only the active
/// purchase driver writes; anyone may read.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Returns an empty record (all zero / false) for products never seen before.
    async fn get_progress(&self, product_id: &str) -> Result<ProgressRecord, Error>;
    async fn set_sent_count(&self, product_id: &str, sent_count: u32) -> Result<(), Error>;
    async fn set_total_count(&self, product_id: &str, total: u32) -> Result<(), Error>;
    async fn mark_cancelled(&self, product_id: &str, cancelled: bool) -> Result<(), Error>;
    async fn mark_redeemed(&self, product_id: &str) -> Result<(), Error>;
    async fn list_redeemed(&self) -> Result<Vec<String>, Error>;

    async fn is_redeemed(&self, product_id: &str) -> Result<bool, Error> {
        Ok(self.get_progress(product_id).await?.redeemed)
    }
}
