// src/purchase/context.rs

use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use smspay_common::models::NetworkIdentity;
use smspay_common::traits::api::EligibilityApi;
use smspay_common::traits::purchase_traits::{IntervalSource, MessageGenerator, ProductCatalogue, SmsTransmitter};
use smspay_common::traits::repository_traits::ProgressRepository;

use crate::eventbus::EventBus;
use crate::services::catalogue::DestinationRange;

/// What to do when a send fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmsErrorPolicy {
    /// Report the error and keep waiting; the user decides whether to cancel.
    #[default]
    AwaitUser,
    /// Report the error and cancel the purchase.
    AutoCancel,
}

/// Tuning knobs of the purchase driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Countdown tick granularity.
    pub tick_millis: u64,
    /// Pause between the final 100% progress event and `Completed`.
    pub completion_delay_millis: u64,
    /// Post logs and poll `received-status` after each delivery.
    pub verify_delivery: bool,
    pub post_log_delay_millis: u64,
    pub not_yet_delay_millis: u64,
    pub max_not_yet_retries: u32,
    pub sms_error_policy: SmsErrorPolicy,
    /// Calling line identifier reported to the service.
    pub cli: String,
    /// Free-form detail sent with logs; the HNI is used when empty.
    pub cli_detail: String,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            tick_millis: 200,
            completion_delay_millis: 2000,
            verify_delivery: false,
            post_log_delay_millis: 5000,
            not_yet_delay_millis: 10_000,
            max_not_yet_retries: 6,
            sms_error_policy: SmsErrorPolicy::AwaitUser,
            cli: String::new(),
            cli_detail: String::new(),
        }
    }
}

impl DriverSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_millis)
    }

    pub fn post_log_delay(&self) -> Duration {
        Duration::from_millis(self.post_log_delay_millis)
    }

    pub fn not_yet_delay(&self) -> Duration {
        Duration::from_millis(self.not_yet_delay_millis)
    }
}

/// Everything the driver needs to know about the environment it runs in.
#[derive(Clone)]
pub struct PurchaseContext {
    pub catalogue: Arc<dyn ProductCatalogue>,
    pub messages: Arc<dyn MessageGenerator>,
    pub destinations: DestinationRange,
    /// Originating network, sent with the eligibility check.
    pub network: NetworkIdentity,
    pub settings: DriverSettings,
    /// Seed for destination selection; OS entropy when `None`.
    pub seed: Option<u64>,
}

/// The collaborators the driver calls into.
pub struct PurchaseDeps {
    pub store: Arc<dyn ProgressRepository>,
    pub transmitter: Arc<dyn SmsTransmitter>,
    pub api: Arc<dyn EligibilityApi>,
    pub intervals: Box<dyn IntervalSource>,
    pub bus: EventBus,
}
