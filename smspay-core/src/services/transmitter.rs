// src/services/transmitter.rs

use std::sync::Arc;
use tracing::info;

use smspay_common::models::{DeliveryResult, OutgoingSms, SentResult};
use smspay_common::traits::purchase_traits::{DeliveryReporter, SmsTransmitter};
use crate::Error;

/// Test-mode transmitter: nothing leaves the process. Every submission is
/// logged and immediately reported as sent and delivered.
#[derive(Debug, Clone, Default)]
pub struct LoopbackTransmitter;

impl SmsTransmitter for LoopbackTransmitter {
    fn submit(&self, sms: &OutgoingSms, reporter: Arc<dyn DeliveryReporter>) -> Result<(), Error> {
        info!("Test SMS: {}: {}", sms.destination, sms.body);
        reporter.sent(SentResult::Ok);
        reporter.delivered(DeliveryResult::Ok);
        Ok(())
    }
}
