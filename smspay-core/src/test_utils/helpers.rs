// File: smspay-core/src/test_utils/helpers.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use smspay_common::models::{NetworkIdentity, Product, PurchaseEvent};
use crate::purchase::{DriverSettings, PurchaseContext, PurchaseDriver, SessionState};
use crate::services::catalogue::{DestinationRange, StaticCatalogue, TemplateMessageGenerator};
use crate::test_utils::fixtures::ScriptedTransmitter;
use crate::{Database, Error};

/// Upper bound for any single wait in tests. Generous because tests usually
/// run with paused time, where it costs nothing.
pub const TEST_WAIT: Duration = Duration::from_secs(600);

/// Fresh in-memory database with migrations applied.
pub async fn setup_test_database() -> Result<Database, Error> {
    let db = Database::new("sqlite::memory:").await?;
    db.migrate().await?;
    Ok(db)
}

/// A context over the given products with default settings and a fixed seed.
pub fn test_context(products: Vec<Product>) -> Result<PurchaseContext, Error> {
    Ok(PurchaseContext {
        catalogue: Arc::new(StaticCatalogue::new(products)?),
        messages: Arc::new(TemplateMessageGenerator),
        destinations: DestinationRange::new(447_700_900_000, 447_700_900_999)?,
        network: NetworkIdentity::new("234", "15"),
        settings: DriverSettings::default(),
        seed: Some(7),
    })
}

/// Next event, or `None` if nothing arrives within `within`.
pub async fn next_event(rx: &mut mpsc::Receiver<PurchaseEvent>, within: Duration) -> Option<PurchaseEvent> {
    timeout(within, rx.recv()).await.ok().flatten()
}

/// Collects events up to and including the first terminal one.
pub async fn collect_until_terminal(rx: &mut mpsc::Receiver<PurchaseEvent>) -> Result<Vec<PurchaseEvent>, Error> {
    let mut events = Vec::new();
    loop {
        let event = next_event(rx, TEST_WAIT)
            .await
            .ok_or_else(|| Error::ChannelClosed(format!("no terminal event; got {events:?}")))?;
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return Ok(events);
        }
    }
}

/// Waits until the driver reaches a state matching `pred`.
pub async fn wait_for_state<F>(driver: &PurchaseDriver, pred: F) -> Result<SessionState, Error>
where
    F: Fn(&SessionState) -> bool,
{
    let mut rx = driver.watch_state();
    let state = timeout(TEST_WAIT, rx.wait_for(|s| pred(s)))
        .await
        .map_err(|_| Error::ChannelClosed(format!("state never matched; stuck in {:?}", driver.state())))?
        .map_err(|_| Error::ChannelClosed("driver stopped".into()))?
        .clone();
    Ok(state)
}

/// Waits until the transmitter has seen at least `n` submissions.
pub async fn wait_for_submissions(transmitter: &ScriptedTransmitter, n: usize) -> Result<(), Error> {
    let poll = async {
        while transmitter.submission_count() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(TEST_WAIT, poll)
        .await
        .map_err(|_| Error::ChannelClosed(format!("expected {n} submissions, saw {}", transmitter.submission_count())))
}

/// Percentages of every `Progress` event, in order.
pub fn percents(events: &[PurchaseEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            PurchaseEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}

/// `sent_count` values of the step-boundary `Progress` events, in order.
pub fn step_counts(events: &[PurchaseEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            PurchaseEvent::Progress { sent_count: Some(n), .. } => Some(*n),
            _ => None,
        })
        .collect()
}
