// File: smspay-core/src/test_utils/fixtures.rs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use smspay_common::models::{DeliveryResult, OutgoingSms, SentResult};
use smspay_common::traits::purchase_traits::{DeliveryReporter, IntervalSource, SmsTransmitter};
use crate::Error;

/// How the scripted transmitter reacts to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitMode {
    /// Record the submission; the test reports outcomes by hand.
    Manual,
    /// Report `sent=ok` and `delivered=ok` straight away.
    AutoDeliver,
    /// Report this `sent` failure and never deliver.
    FailSent(SentResult),
    /// Refuse the submission synchronously.
    Reject(String),
}

struct Recorded {
    sms: OutgoingSms,
    reporter: Arc<dyn DeliveryReporter>,
}

struct Inner {
    mode: TransmitMode,
    submissions: Vec<Recorded>,
}

/// Transmitter double that records every submission and keeps its reporter
/// so tests can replay callbacks, including late ones.
#[derive(Clone)]
pub struct ScriptedTransmitter {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransmitter {
    pub fn new(mode: TransmitMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                mode,
                submissions: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn submission_count(&self) -> usize {
        self.lock().submissions.len()
    }

    pub fn submissions(&self) -> Vec<OutgoingSms> {
        self.lock().submissions.iter().map(|r| r.sms.clone()).collect()
    }

    /// Reporter of the `n`-th submission (zero-based).
    pub fn reporter(&self, n: usize) -> Result<Arc<dyn DeliveryReporter>, Error> {
        self.lock()
            .submissions
            .get(n)
            .map(|r| r.reporter.clone())
            .ok_or_else(|| Error::NotFound(format!("submission {n}")))
    }

    /// Reports `sent=ok` then `delivered=ok` for the `n`-th submission.
    pub fn deliver(&self, n: usize) -> Result<(), Error> {
        let reporter = self.reporter(n)?;
        reporter.sent(SentResult::Ok);
        reporter.delivered(DeliveryResult::Ok);
        Ok(())
    }
}

impl SmsTransmitter for ScriptedTransmitter {
    fn submit(&self, sms: &OutgoingSms, reporter: Arc<dyn DeliveryReporter>) -> Result<(), Error> {
        let mode = {
            let mut inner = self.lock();
            if let TransmitMode::Reject(reason) = &inner.mode {
                return Err(Error::Transmit(reason.clone()));
            }
            inner.submissions.push(Recorded {
                sms: sms.clone(),
                reporter: reporter.clone(),
            });
            inner.mode.clone()
        };

        match mode {
            TransmitMode::AutoDeliver => {
                reporter.sent(SentResult::Ok);
                reporter.delivered(DeliveryResult::Ok);
            }
            TransmitMode::FailSent(result) => reporter.sent(result),
            TransmitMode::Manual | TransmitMode::Reject(_) => {}
        }
        Ok(())
    }
}

/// Interval source that replays a fixed list, then repeats its last value.
#[derive(Debug, Clone)]
pub struct ScriptedIntervals {
    queue: VecDeque<u32>,
    last: u32,
}

impl ScriptedIntervals {
    pub fn new(intervals: impl IntoIterator<Item = u32>) -> Self {
        Self {
            queue: intervals.into_iter().collect(),
            last: 1,
        }
    }
}

impl IntervalSource for ScriptedIntervals {
    fn next_interval(&mut self) -> u32 {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
