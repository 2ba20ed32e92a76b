// smspay-server/src/offline.rs

use async_trait::async_trait;
use tracing::info;

use smspay_common::models::{HniStatus, PostLogsBody, ReceivedStatus, ReceivedStatusQuery};
use smspay_common::traits::api::EligibilityApi;
use smspay_core::Error;

/// Stand-in for the remote service when running with `--offline`:
/// every network is whitelisted and every delivery confirmed.
pub struct OfflineEligibility;

#[async_trait]
impl EligibilityApi for OfflineEligibility {
    async fn get_hni_status(&self, mcc: &str, mnc: &str) -> Result<HniStatus, Error> {
        info!("(offline) HNI {}{} treated as whitelisted", mcc, mnc);
        Ok(HniStatus::Whitelisted)
    }

    async fn post_logs(&self, body: &PostLogsBody) -> Result<(), Error> {
        info!("(offline) dropping {} log entries", body.entries.len());
        Ok(())
    }

    async fn get_received_status(&self, _query: &ReceivedStatusQuery) -> Result<ReceivedStatus, Error> {
        Ok(ReceivedStatus::Yes)
    }
}
