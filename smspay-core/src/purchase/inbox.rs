// src/purchase/inbox.rs

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use smspay_common::models::{DeliveryResult, HniStatus, Product, ReceivedStatus, SentResult};
use smspay_common::traits::purchase_traits::DeliveryReporter;
use crate::Error;

/// Everything that can happen to the driver. Inputs produced by timers and
/// callbacks carry the epoch of the session that produced them; the driver
/// drops any whose session is gone.
#[derive(Debug)]
pub(crate) enum DriverInput {
    Start { product: Product },
    Cancel,
    Shutdown,
    Tick { epoch: u64, left: Duration },
    WaitElapsed { epoch: u64 },
    Sent { epoch: u64, index: u32, result: SentResult },
    Delivered { epoch: u64, index: u32, result: DeliveryResult },
    HniStatus { epoch: u64, result: Result<HniStatus, Error> },
    LogsPosted { epoch: u64, result: Result<(), Error> },
    ReceivedStatus { epoch: u64, result: Result<ReceivedStatus, Error> },
    RecheckReceived { epoch: u64 },
    CompletionDue { epoch: u64 },
}

impl DriverInput {
    pub(crate) fn epoch(&self) -> Option<u64> {
        match self {
            DriverInput::Start { .. } | DriverInput::Cancel | DriverInput::Shutdown => None,
            DriverInput::Tick { epoch, .. }
            | DriverInput::WaitElapsed { epoch }
            | DriverInput::Sent { epoch, .. }
            | DriverInput::Delivered { epoch, .. }
            | DriverInput::HniStatus { epoch, .. }
            | DriverInput::LogsPosted { epoch, .. }
            | DriverInput::ReceivedStatus { epoch, .. }
            | DriverInput::RecheckReceived { epoch }
            | DriverInput::CompletionDue { epoch } => Some(*epoch),
        }
    }
}

/// Transmitter callbacks for one submission, routed back into the driver inbox.
pub(crate) struct ReportSink {
    inbox: UnboundedSender<DriverInput>,
    epoch: u64,
    index: u32,
}

impl ReportSink {
    pub(crate) fn new(inbox: UnboundedSender<DriverInput>, epoch: u64, index: u32) -> Self {
        Self { inbox, epoch, index }
    }
}

impl DeliveryReporter for ReportSink {
    fn sent(&self, result: SentResult) {
        let _ = self.inbox.send(DriverInput::Sent {
            epoch: self.epoch,
            index: self.index,
            result,
        });
    }

    fn delivered(&self, result: DeliveryResult) {
        let _ = self.inbox.send(DriverInput::Delivered {
            epoch: self.epoch,
            index: self.index,
            result,
        });
    }
}
