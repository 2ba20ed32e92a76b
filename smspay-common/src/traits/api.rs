use async_trait::async_trait;
use crate::error::Error;
use crate::models::{HniStatus, PostLogsBody, ReceivedStatus, ReceivedStatusQuery};

/// The remote eligibility / reporting service.
///
/// Any failure to obtain a well-formed answer is reported as an `Err`;
/// callers treat it as "no connection".
#[async_trait]
pub trait EligibilityApi: Send + Sync {
    async fn get_hni_status(&self, mcc: &str, mnc: &str) -> Result<HniStatus, Error>;
    async fn post_logs(&self, body: &PostLogsBody) -> Result<(), Error>;
    async fn get_received_status(&self, query: &ReceivedStatusQuery) -> Result<ReceivedStatus, Error>;
}
