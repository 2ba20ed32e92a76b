// src/network/slot.rs
//
// At most one in-flight request per kind: starting a new request in a slot
// aborts whatever was still running there.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct RequestSlot {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl RequestSlot {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(fut));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("Aborting in-flight '{}' request", self.name);
                handle.abort();
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One slot per remote operation.
pub struct RequestSlots {
    pub hni_status: RequestSlot,
    pub post_logs: RequestSlot,
    pub received_status: RequestSlot,
}

impl Default for RequestSlots {
    fn default() -> Self {
        Self {
            hni_status: RequestSlot::new("hni-status"),
            post_logs: RequestSlot::new("logs"),
            received_status: RequestSlot::new("received-status"),
        }
    }
}

impl RequestSlots {
    pub fn cancel_all(&mut self) {
        self.hni_status.cancel();
        self.post_logs.cancel();
        self.received_status.cancel();
    }
}
