// src/purchase/driver.rs

use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use smspay_common::models::sms::DELIVERY_FAILED_MESSAGE;
use smspay_common::models::{
    DeliveryResult, HniStatus, LogEntry, OutgoingSms, PostLogsBody, Product, PurchaseEvent,
    ReceivedStatus, ReceivedStatusQuery, SentResult,
};
use smspay_common::traits::api::EligibilityApi;
use smspay_common::traits::purchase_traits::{IntervalSource, ProductCatalogue, SmsTransmitter};
use smspay_common::traits::repository_traits::ProgressRepository;

use crate::eventbus::EventBus;
use crate::network::RequestSlots;
use crate::purchase::context::{PurchaseContext, PurchaseDeps, SmsErrorPolicy};
use crate::purchase::inbox::{DriverInput, ReportSink};
use crate::purchase::pacing::PacingPlan;
use crate::purchase::state::{SessionState, Termination};
use crate::tasks::{spawn_after, spawn_countdown};
use crate::Error;

/// Handle to the purchase driver actor.
///
/// `start` and `cancel` only enqueue work and return immediately; the outcome
/// of a purchase is reported on the event bus. Dropping the handle stops the actor.
pub struct PurchaseDriver {
    inbox: mpsc::UnboundedSender<DriverInput>,
    catalogue: Arc<dyn ProductCatalogue>,
    state_rx: watch::Receiver<SessionState>,
    task: Option<JoinHandle<()>>,
}

impl PurchaseDriver {
    /// Spawns the driver actor on the current tokio runtime.
    pub fn spawn(ctx: PurchaseContext, deps: PurchaseDeps) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let catalogue = ctx.catalogue.clone();
        let actor = PurchaseActor::new(ctx, deps, tx.clone(), state_tx);
        let task = tokio::spawn(actor.run(rx));
        Self {
            inbox: tx,
            catalogue,
            state_rx,
            task: Some(task),
        }
    }

    /// Begins, or resumes, the purchase of `product_id`.
    ///
    /// Only an unknown product (or a stopped driver) is reported here; every
    /// other outcome arrives as an event.
    pub fn start(&self, product_id: &str) -> Result<(), Error> {
        let product = self.catalogue.product(product_id).ok_or_else(|| {
            warn!("Start requested for unknown product '{}'", product_id);
            Error::UnknownProduct(product_id.to_string())
        })?;
        self.inbox
            .send(DriverInput::Start { product })
            .map_err(|_| Error::ChannelClosed("purchase driver has stopped".into()))
    }

    /// Requests cancellation of the current purchase. Safe to call at any time.
    pub fn cancel(&self) {
        let _ = self.inbox.send(DriverInput::Cancel);
    }

    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Stops the actor, tearing down any running session, and waits for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.inbox.send(DriverInput::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PurchaseDriver {
    fn drop(&mut self) {
        let _ = self.inbox.send(DriverInput::Shutdown);
    }
}

/// One purchase attempt. Dropping it aborts its timers and in-flight requests.
struct Session {
    epoch: u64,
    product: Product,
    total: u32,
    sent_count: u32,
    plan: PacingPlan,
    /// The first send of a run goes out without waiting.
    first_send: bool,
    last_percent: u8,
    timer: Option<JoinHandle<()>>,
    requests: RequestSlots,
    not_yet_polls: u32,
    last_sms: Option<(OutgoingSms, DateTime<Utc>)>,
}

impl Session {
    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_timer();
        self.requests.cancel_all();
    }
}

struct PurchaseActor {
    ctx: PurchaseContext,
    store: Arc<dyn ProgressRepository>,
    transmitter: Arc<dyn SmsTransmitter>,
    api: Arc<dyn EligibilityApi>,
    intervals: Box<dyn IntervalSource>,
    bus: EventBus,
    inbox: mpsc::UnboundedSender<DriverInput>,
    state_tx: watch::Sender<SessionState>,
    rng: StdRng,
    next_epoch: u64,
    session: Option<Session>,
}

impl PurchaseActor {
    fn new(
        ctx: PurchaseContext,
        deps: PurchaseDeps,
        inbox: mpsc::UnboundedSender<DriverInput>,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        let rng = match ctx.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            ctx,
            store: deps.store,
            transmitter: deps.transmitter,
            api: deps.api,
            intervals: deps.intervals,
            bus: deps.bus,
            inbox,
            state_tx,
            rng,
            next_epoch: 0,
            session: None,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DriverInput>) {
        let mut shutdown = self.bus.shutdown_rx.clone();
        info!("Purchase driver started");
        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(DriverInput::Shutdown) | None => break,
                    Some(input) => self.on_event(input).await,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        if let Some(session) = self.session.take() {
            info!("Driver stopping with purchase of '{}' still open", session.product.product_id);
        }
        info!("Purchase driver stopped");
    }

    fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    fn set_state(&self, state: SessionState) {
        debug!("Purchase state -> {:?}", state);
        self.state_tx.send_replace(state);
    }

    fn current_epoch(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.epoch)
    }

    /// The reducer: the only place session state changes.
    async fn on_event(&mut self, input: DriverInput) {
        if let Some(epoch) = input.epoch() {
            if self.current_epoch() != Some(epoch) {
                debug!("Discarding stale input from session {}: {:?}", epoch, input);
                return;
            }
        }

        let result = match input {
            DriverInput::Start { product } => self.on_start(product).await,
            DriverInput::Cancel => {
                self.on_cancel().await;
                Ok(())
            }
            DriverInput::Shutdown => Ok(()),
            DriverInput::Tick { left, .. } => {
                self.on_tick(left).await;
                Ok(())
            }
            DriverInput::WaitElapsed { .. } => self.on_wait_elapsed().await,
            DriverInput::Sent { index, result, .. } => self.on_sent(index, result).await,
            DriverInput::Delivered { index, result, .. } => self.on_delivered(index, result).await,
            DriverInput::HniStatus { result, .. } => self.on_hni_status(result).await,
            DriverInput::LogsPosted { result, .. } => {
                self.on_logs_posted(result).await;
                Ok(())
            }
            DriverInput::ReceivedStatus { result, .. } => self.on_received_status(result).await,
            DriverInput::RecheckReceived { .. } => {
                if self.state() == SessionState::Verifying {
                    self.request_received_status();
                }
                Ok(())
            }
            DriverInput::CompletionDue { .. } => {
                self.on_completion_due().await;
                Ok(())
            }
        };

        if let Err(e) = result {
            self.fail(e).await;
        }
    }

    // ---------------------------------------------------------------
    // Start / resume
    // ---------------------------------------------------------------

    async fn on_start(&mut self, product: Product) -> Result<(), Error> {
        if let Some(active) = &self.session {
            warn!(
                "Purchase of '{}' already in progress; ignoring start for '{}'",
                active.product.product_id, product.product_id
            );
            return Ok(());
        }

        let pid = product.product_id.clone();
        let record = self.store.get_progress(&pid).await?;

        if record.redeemed {
            info!("Product '{}' is already redeemed", pid);
            self.bus.publish(PurchaseEvent::Completed).await;
            self.set_state(SessionState::Terminated(Termination::Redeemed));
            return Ok(());
        }

        self.store.mark_cancelled(&pid, false).await?;

        let total = if record.sent_count == 0 {
            self.store.set_total_count(&pid, product.required_sms_count).await?;
            product.required_sms_count
        } else {
            record.total_count.unwrap_or(product.required_sms_count)
        };
        let sent_count = record.sent_count.min(total);
        let waits = total.saturating_sub(sent_count).saturating_sub(1);
        let plan = PacingPlan::build(waits, self.intervals.as_mut());

        self.next_epoch += 1;
        info!(
            "Starting purchase of '{}' at {}/{} ({} waits, {}s planned, session {})",
            pid,
            sent_count,
            total,
            plan.len(),
            plan.total_seconds(),
            self.next_epoch
        );
        self.session = Some(Session {
            epoch: self.next_epoch,
            product,
            total,
            sent_count,
            plan,
            first_send: true,
            last_percent: 0,
            timer: None,
            requests: RequestSlots::default(),
            not_yet_polls: 0,
            last_sms: None,
        });

        if sent_count >= total {
            info!("All SMS for '{}' already delivered; completing", pid);
            return self.complete().await;
        }

        if sent_count == 0 {
            self.check_eligibility();
            Ok(())
        } else {
            info!("Resuming '{}' after {} delivered SMS; skipping eligibility", pid, sent_count);
            self.begin_next_send().await
        }
    }

    fn check_eligibility(&mut self) {
        self.set_state(SessionState::CheckingEligibility);
        let Some(session) = self.session.as_mut() else { return };

        let api = self.api.clone();
        let tx = self.inbox.clone();
        let network = self.ctx.network.clone();
        let epoch = session.epoch;
        info!("Checking HNI {} before the first SMS", network.hni());

        session.requests.hni_status.spawn(async move {
            let result = api.get_hni_status(&network.mcc, &network.mnc).await;
            let _ = tx.send(DriverInput::HniStatus { epoch, result });
        });
    }

    async fn on_hni_status(&mut self, result: Result<HniStatus, Error>) -> Result<(), Error> {
        if self.state() != SessionState::CheckingEligibility {
            return Ok(());
        }
        match result {
            Ok(HniStatus::Whitelisted) => {
                info!("HNI whitelisted; sending first SMS");
                self.begin_next_send().await
            }
            Ok(status) => {
                info!("HNI status {:?}; purchase unsupported on this network", status);
                self.terminate(PurchaseEvent::Unsupported, Termination::Unsupported).await;
                Ok(())
            }
            Err(e) => {
                warn!("HNI status check failed: {}", e);
                self.terminate(PurchaseEvent::NoConnection, Termination::NoConnection).await;
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------
    // Pacing
    // ---------------------------------------------------------------

    /// Publishes the step's progress, then either sends right away or starts
    /// the countdown for the next interval.
    async fn begin_next_send(&mut self) -> Result<(), Error> {
        let Some(session) = self.session.as_mut() else { return Ok(()) };

        let interval = if session.first_send {
            0
        } else {
            session.plan.next_interval().unwrap_or(0)
        };
        let percent = session.plan.percent(Duration::ZERO).max(session.last_percent);
        session.last_percent = percent;
        let sent_count = session.sent_count;

        if interval == 0 {
            session.first_send = false;
            self.bus.publish(PurchaseEvent::progress(sent_count, percent)).await;
            return self.submit().await;
        }

        let epoch = session.epoch;
        session.timer = Some(spawn_countdown(
            Duration::from_secs(u64::from(interval)),
            self.ctx.settings.tick(),
            self.inbox.clone(),
            move |left| DriverInput::Tick { epoch, left },
            move || DriverInput::WaitElapsed { epoch },
        ));
        self.set_state(SessionState::Waiting {
            interval_secs: interval,
            remaining: Duration::from_secs(u64::from(interval)),
        });
        self.bus.publish(PurchaseEvent::progress(sent_count, percent)).await;
        Ok(())
    }

    async fn on_tick(&mut self, left: Duration) {
        let SessionState::Waiting { interval_secs, .. } = self.state() else { return };
        self.set_state(SessionState::Waiting { interval_secs, remaining: left });
        let Some(session) = self.session.as_mut() else { return };

        let elapsed = Duration::from_secs(u64::from(interval_secs)).saturating_sub(left);
        let percent = session.plan.percent(elapsed);
        if percent > session.last_percent {
            session.last_percent = percent;
            self.bus.publish(PurchaseEvent::percent(percent)).await;
        }
    }

    async fn on_wait_elapsed(&mut self) -> Result<(), Error> {
        if !matches!(self.state(), SessionState::Waiting { .. }) {
            return Ok(());
        }
        if let Some(session) = self.session.as_mut() {
            session.timer = None;
            session.plan.pop_interval();
        }
        self.submit().await
    }

    // ---------------------------------------------------------------
    // Sending
    // ---------------------------------------------------------------

    async fn submit(&mut self) -> Result<(), Error> {
        self.set_state(SessionState::Submitting);
        let Some(session) = self.session.as_mut() else { return Ok(()) };

        let index = session.sent_count;
        let sms = OutgoingSms {
            destination: self.ctx.destinations.pick(&mut self.rng),
            body: self.ctx.messages.generate(&session.product, session.total, index),
            index,
        };
        session.last_sms = Some((sms.clone(), Utc::now()));
        let reporter = Arc::new(ReportSink::new(self.inbox.clone(), session.epoch, index));

        info!("Submitting SMS {}/{} to {}", index + 1, session.total, sms.destination);
        let submitted = self.transmitter.submit(&sms, reporter);
        self.set_state(SessionState::AwaitingConfirmation);

        if let Err(e) = submitted {
            warn!("Transmitter rejected SMS {}: {}", index + 1, e);
            self.on_sms_error(e.to_string()).await;
        }
        Ok(())
    }

    /// True when a callback refers to the submission the session is waiting on.
    fn is_awaited(&self, index: u32) -> bool {
        self.state() == SessionState::AwaitingConfirmation
            && self.session.as_ref().is_some_and(|s| s.sent_count == index)
    }

    async fn on_sent(&mut self, index: u32, result: SentResult) -> Result<(), Error> {
        if !self.is_awaited(index) {
            debug!("Ignoring sent={:?} for SMS index {}", result, index);
            return Ok(());
        }
        match result.error_message() {
            Some(message) => {
                warn!("SMS {} failed to send: {}", index + 1, message);
                self.on_sms_error(message.to_string()).await;
            }
            None => debug!("SMS {} sent; awaiting delivery", index + 1),
        }
        Ok(())
    }

    async fn on_delivered(&mut self, index: u32, result: DeliveryResult) -> Result<(), Error> {
        if !self.is_awaited(index) {
            debug!("Ignoring delivered={:?} for SMS index {}", result, index);
            return Ok(());
        }
        if result == DeliveryResult::Cancelled {
            warn!("SMS {} was not delivered", index + 1);
            self.on_sms_error(DELIVERY_FAILED_MESSAGE.to_string()).await;
            return Ok(());
        }

        let Some(session) = self.session.as_mut() else { return Ok(()) };
        let sent_count = session.sent_count + 1;
        self.store.set_sent_count(&session.product.product_id, sent_count).await?;
        session.sent_count = sent_count;
        info!("SMS {}/{} delivered", sent_count, session.total);

        if self.ctx.settings.verify_delivery {
            self.start_verification();
            Ok(())
        } else {
            self.advance().await
        }
    }

    async fn on_sms_error(&mut self, message: String) {
        self.bus.publish(PurchaseEvent::SmsError { message }).await;
        if self.ctx.settings.sms_error_policy == SmsErrorPolicy::AutoCancel {
            info!("Cancelling purchase after SMS error");
            self.on_cancel().await;
        }
    }

    async fn advance(&mut self) -> Result<(), Error> {
        let Some(session) = self.session.as_ref() else { return Ok(()) };
        if session.sent_count >= session.total {
            self.complete().await
        } else {
            self.begin_next_send().await
        }
    }

    // ---------------------------------------------------------------
    // Delivery verification: post logs, then poll received-status
    // ---------------------------------------------------------------

    fn start_verification(&mut self) {
        self.set_state(SessionState::Verifying);
        let Some(session) = self.session.as_mut() else { return };

        let entries = session
            .last_sms
            .iter()
            .map(|(sms, sent_at)| LogEntry {
                destination: sms.destination.clone(),
                message: sms.body.clone(),
                sent_at: *sent_at,
            })
            .collect();
        let settings = &self.ctx.settings;
        let body = PostLogsBody {
            entries,
            cli: settings.cli.clone(),
            cli_detail: if settings.cli_detail.is_empty() {
                self.ctx.network.hni()
            } else {
                settings.cli_detail.clone()
            },
        };
        session.not_yet_polls = 0;

        let api = self.api.clone();
        let tx = self.inbox.clone();
        let epoch = session.epoch;
        let delay = settings.post_log_delay();
        session.requests.post_logs.spawn(async move {
            tokio::time::sleep(delay).await;
            let result = api.post_logs(&body).await;
            let _ = tx.send(DriverInput::LogsPosted { epoch, result });
        });
    }

    async fn on_logs_posted(&mut self, result: Result<(), Error>) {
        if self.state() != SessionState::Verifying {
            return;
        }
        match result {
            Ok(()) => self.request_received_status(),
            Err(e) => {
                warn!("Posting delivery logs failed: {}", e);
                self.terminate(PurchaseEvent::NoConnection, Termination::NoConnection).await;
            }
        }
    }

    fn request_received_status(&mut self) {
        let Some(session) = self.session.as_mut() else { return };

        let query = ReceivedStatusQuery {
            cli: self.ctx.settings.cli.clone(),
            ddi: session
                .last_sms
                .as_ref()
                .map(|(sms, _)| sms.destination.clone())
                .unwrap_or_default(),
            r2: session.sent_count.to_string(),
            r3: session.total.to_string(),
        };
        let api = self.api.clone();
        let tx = self.inbox.clone();
        let epoch = session.epoch;
        session.requests.received_status.spawn(async move {
            let result = api.get_received_status(&query).await;
            let _ = tx.send(DriverInput::ReceivedStatus { epoch, result });
        });
    }

    async fn on_received_status(&mut self, result: Result<ReceivedStatus, Error>) -> Result<(), Error> {
        if self.state() != SessionState::Verifying {
            return Ok(());
        }
        match result {
            Ok(ReceivedStatus::Yes) => {
                debug!("Service confirmed receipt");
                self.advance().await
            }
            Ok(ReceivedStatus::NotYet) => {
                let max_polls = self.ctx.settings.max_not_yet_retries;
                let delay = self.ctx.settings.not_yet_delay();
                let Some(session) = self.session.as_mut() else { return Ok(()) };
                session.not_yet_polls += 1;
                if session.not_yet_polls > max_polls {
                    warn!("Service never confirmed receipt after {} polls", max_polls);
                    self.terminate(PurchaseEvent::NoConnection, Termination::NoConnection).await;
                    return Ok(());
                }
                debug!(
                    "Receipt not confirmed yet; polling again in {:?} ({}/{})",
                    delay, session.not_yet_polls, max_polls
                );
                let epoch = session.epoch;
                session.requests.received_status.spawn({
                    let tx = self.inbox.clone();
                    async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(DriverInput::RecheckReceived { epoch });
                    }
                });
                Ok(())
            }
            Ok(ReceivedStatus::Other) => {
                info!("Service rejected receipt; purchase unsupported");
                self.terminate(PurchaseEvent::Unsupported, Termination::Unsupported).await;
                Ok(())
            }
            Err(e) => {
                warn!("received-status check failed: {}", e);
                self.terminate(PurchaseEvent::NoConnection, Termination::NoConnection).await;
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------
    // Completion, cancellation, termination
    // ---------------------------------------------------------------

    async fn complete(&mut self) -> Result<(), Error> {
        self.set_state(SessionState::Completing);
        let Some(session) = self.session.as_mut() else { return Ok(()) };

        self.store.mark_redeemed(&session.product.product_id).await?;
        session.stop_timer();
        session.last_percent = 100;
        info!("Purchase of '{}' complete; product redeemed", session.product.product_id);

        let total = session.total;
        let epoch = session.epoch;
        session.timer = Some(spawn_after(
            self.ctx.settings.completion_delay(),
            self.inbox.clone(),
            DriverInput::CompletionDue { epoch },
        ));
        self.bus.publish(PurchaseEvent::progress(total, 100)).await;
        Ok(())
    }

    async fn on_completion_due(&mut self) {
        if self.state() != SessionState::Completing {
            return;
        }
        self.terminate(PurchaseEvent::Completed, Termination::Redeemed).await;
    }

    async fn on_cancel(&mut self) {
        let Some(session) = self.session.as_ref() else {
            debug!("Cancel requested with no purchase in progress");
            return;
        };
        if self.state() == SessionState::Completing {
            info!("Purchase of '{}' already redeemed; ignoring cancel", session.product.product_id);
            return;
        }

        info!("Cancelling purchase of '{}'", session.product.product_id);
        self.set_state(SessionState::Cancelling);
        // Dropping the session stops its countdown and in-flight requests, and
        // makes every callback still on its way stale.
        let Some(session) = self.session.take() else { return };
        let pid = session.product.product_id.clone();
        drop(session);

        if let Err(e) = self.store.mark_cancelled(&pid, true).await {
            error!("Failed to persist cancellation of '{}': {}", pid, e);
        }
        self.bus.publish(PurchaseEvent::Cancelled { product_id: pid }).await;
        self.set_state(SessionState::Terminated(Termination::Cancelled));
    }

    async fn terminate(&mut self, event: PurchaseEvent, termination: Termination) {
        if let Some(session) = self.session.take() {
            info!(
                "Purchase of '{}' ended: {} ({}/{} delivered)",
                session.product.product_id, termination, session.sent_count, session.total
            );
        }
        self.bus.publish(event).await;
        self.set_state(SessionState::Terminated(termination));
    }

    async fn fail(&mut self, e: Error) {
        error!("Purchase aborted: {}", e);
        self.terminate(PurchaseEvent::Failed { message: e.to_string() }, Termination::Failed).await;
    }
}
