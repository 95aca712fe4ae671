//! Live feed controller: the bounded, time-ordered buffer behind the live
//! pane, plus the connection state of whichever source drives it.
//!
//! # Model
//!
//! Exactly one source is active at a time. Sources run as tokio tasks and
//! never touch the controller directly: they send [`SourceSignal`]s over a
//! channel, and the owner applies them with [`LiveFeed::pump`] (non-blocking,
//! once per UI frame) or [`LiveFeed::next_signal`] (awaits one).
//!
//! ```text
//!  timer task ──Tick──┐
//!                     ├──► channel ──► pump() ──► append / status
//!  SSE task ──Opened/Payload/Failed──┘
//!  retry timer ──RetryDue──┘
//! ```
//!
//! # Cancellation
//!
//! Every acquisition gets a fresh epoch and every signal carries the epoch
//! of the task that sent it. Releasing a source aborts its task and bumps
//! the epoch, so signals already queued by the old task are dropped when
//! they are pumped. Once `pause()` or `dispose()` returns, nothing the old
//! source sent can reach the buffer.
//!
//! # Connection state
//!
//! | From | To | Trigger |
//! |------|----|---------|
//! | any | `connected` | synthetic timer armed / stream opened |
//! | any | `connecting` | external acquisition started (start, resume, retry) |
//! | `connecting`/`connected` | `disconnected` | stream failed or closed; external pause |
//!
//! A failure schedules one retry after `retry_delay`; a second failure
//! replaces the pending retry rather than adding another.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tradewatch_core::config::{FeedConfig, FeedModeKind};
use tradewatch_core::{ConnectionState, LogEvent};

use crate::decode::decode_payload;
use crate::error::FeedError;
use crate::sse::{HttpSseConnector, StreamConnector};
use crate::synthetic::SyntheticGenerator;

/// Default live buffer bound.
pub const DEFAULT_CAPACITY: usize = 200;

/// Window used by [`LiveFeed::ops_per_minute`].
const RATE_WINDOW: chrono::TimeDelta = chrono::TimeDelta::seconds(60);

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Which source drives the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    /// Internal generator on a fixed timer.
    Synthetic,
    /// SSE endpoint URL.
    External(String),
}

impl FeedMode {
    pub fn from_config(cfg: &FeedConfig) -> Self {
        match cfg.mode {
            FeedModeKind::Synthetic => FeedMode::Synthetic,
            FeedModeKind::External => FeedMode::External(cfg.endpoint.clone()),
        }
    }
}

/// Tunables for a [`LiveFeed`].
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub capacity: usize,
    /// Synthetic timer period.
    pub tick: Duration,
    /// Fixed delay before re-acquiring a failed external stream.
    pub retry_delay: Duration,
    /// Account pool for synthetic events.
    pub accounts: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FeedSettings {
    fn from(cfg: &FeedConfig) -> Self {
        Self {
            capacity: cfg.capacity,
            tick: cfg.tick(),
            retry_delay: cfg.retry_delay(),
            accounts: cfg.accounts.clone(),
            seed: cfg.seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// A message from a source task to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSignal {
    /// Synthetic timer fired.
    Tick,
    /// External stream accepted the subscription.
    Opened,
    /// One raw external message payload.
    Payload(String),
    /// External stream failed or closed.
    Failed(String),
    /// Retry delay elapsed.
    RetryDue,
}

#[derive(Debug)]
struct Envelope {
    epoch: u64,
    signal: SourceSignal,
}

/// What applying a batch of signals changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub appended: usize,
    /// Status transitions in the order they happened.
    pub transitions: Vec<ConnectionState>,
}

impl PumpReport {
    pub fn is_empty(&self) -> bool {
        self.appended == 0 && self.transitions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LiveFeed
// ---------------------------------------------------------------------------

pub struct LiveFeed {
    mode: FeedMode,
    settings: FeedSettings,
    connector: Arc<dyn StreamConnector>,
    generator: SyntheticGenerator,

    buffer: VecDeque<LogEvent>,
    ids: HashSet<String>,
    status: ConnectionState,
    transitions: Vec<ConnectionState>,

    started: bool,
    paused: bool,
    disposed: bool,
    epoch: u64,
    /// Counter behind generated ids for payloads that carry none.
    fallback_seq: u64,

    source: Option<JoinHandle<()>>,
    retry: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl LiveFeed {
    /// Build a controller whose external mode speaks HTTP.
    pub fn new(mode: FeedMode, settings: FeedSettings) -> Self {
        Self::with_connector(mode, settings, Arc::new(HttpSseConnector::new()))
    }

    /// Build a controller with a custom transport for external mode.
    pub fn with_connector(
        mode: FeedMode,
        settings: FeedSettings,
        connector: Arc<dyn StreamConnector>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let generator = SyntheticGenerator::new(settings.accounts.clone(), settings.seed);
        Self {
            mode,
            buffer: VecDeque::with_capacity(settings.capacity.min(DEFAULT_CAPACITY * 4)),
            settings,
            connector,
            generator,
            ids: HashSet::new(),
            status: ConnectionState::Connecting,
            transitions: Vec::new(),
            started: false,
            paused: false,
            disposed: false,
            epoch: 0,
            fallback_seq: 0,
            source: None,
            retry: None,
            tx,
            rx,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn mode(&self) -> &FeedMode {
        &self.mode
    }

    pub fn status(&self) -> ConnectionState {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn capacity(&self) -> usize {
        self.settings.capacity
    }

    /// Buffered events, oldest first.
    pub fn events(&self) -> &VecDeque<LogEvent> {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True while a source task or a retry timer is held.
    pub fn has_active_source(&self) -> bool {
        self.source.is_some() || self.retry.is_some()
    }

    /// Events buffered within the minute before `now`. Zero while paused.
    pub fn ops_per_minute(&self, now: DateTime<Utc>) -> usize {
        if self.paused {
            return 0;
        }
        let since = now - RATE_WINDOW;
        self.buffer
            .iter()
            .rev()
            .take_while(|event| event.timestamp > since)
            .count()
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Acquire the configured source. Must run inside a tokio runtime.
    ///
    /// Calling `start` on a running feed replaces the source; on a paused feed
    /// it only records that the feed should run once resumed.
    pub fn start(&mut self) {
        if self.disposed {
            tracing::debug!("start ignored: feed disposed");
            return;
        }
        self.started = true;
        if self.paused {
            return;
        }
        self.acquire();
    }

    /// Stop appending and release the active source. Idempotent.
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.release();
        if matches!(self.mode, FeedMode::External(_)) {
            self.set_status(ConnectionState::Disconnected);
        }
        tracing::info!(status = %self.status, "feed paused");
    }

    /// Re-acquire the source after a pause. Idempotent.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        tracing::info!("feed resumed");
        if self.started && !self.disposed {
            self.acquire();
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Cancel the timer, close the subscription and drop any pending retry.
    /// The feed cannot be restarted afterwards. Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.started = false;
        self.release();
        tracing::debug!("feed disposed");
    }

    // ── Buffer ─────────────────────────────────────────────────────────────

    /// Push `event` at the tail, evicting from the head beyond capacity.
    ///
    /// Returns `false` without touching the buffer when an event with the same
    /// id is already buffered.
    pub fn append(&mut self, event: LogEvent) -> bool {
        if self.ids.contains(&event.id) {
            tracing::warn!(id = %event.id, "duplicate event id dropped");
            return false;
        }
        self.ids.insert(event.id.clone());
        self.buffer.push_back(event);

        while self.buffer.len() > self.settings.capacity {
            if let Some(evicted) = self.buffer.pop_front() {
                self.ids.remove(&evicted.id);
            }
        }
        true
    }

    // ── Signal application ─────────────────────────────────────────────────

    /// Apply every queued signal without blocking.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        while let Ok(envelope) = self.rx.try_recv() {
            self.dispatch(envelope, &mut report);
        }
        report.transitions.extend(self.transitions.drain(..));
        report
    }

    /// Wait for the next signal and apply it. Stale signals yield an empty
    /// report.
    pub async fn next_signal(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        // The controller holds a sender, so the channel never closes.
        if let Some(envelope) = self.rx.recv().await {
            self.dispatch(envelope, &mut report);
        }
        report.transitions.extend(self.transitions.drain(..));
        report
    }

    fn dispatch(&mut self, envelope: Envelope, report: &mut PumpReport) {
        if envelope.epoch != self.epoch {
            tracing::trace!(
                signal_epoch = envelope.epoch,
                epoch = self.epoch,
                "stale signal dropped"
            );
            return;
        }
        match envelope.signal {
            SourceSignal::Tick => {
                if self.on_tick() {
                    report.appended += 1;
                }
            }
            SourceSignal::Opened => self.on_open(),
            SourceSignal::Payload(payload) => {
                if self.on_payload(&payload) {
                    report.appended += 1;
                }
            }
            SourceSignal::Failed(reason) => self.on_transport_error(&reason),
            SourceSignal::RetryDue => self.on_retry_due(),
        }
    }

    // ── Entry points ───────────────────────────────────────────────────────
    //
    // Source tasks reach these only through the channel. They are public so a
    // host can drive the controller from its own event loop.

    /// Synthetic timer fired: manufacture and append one event.
    pub fn on_tick(&mut self) -> bool {
        if self.paused || self.disposed {
            return false;
        }
        let now = self.receipt_time();
        let event = self.generator.next_event(now);
        self.append(event)
    }

    /// External stream accepted the subscription.
    pub fn on_open(&mut self) {
        if self.paused || self.disposed {
            return;
        }
        tracing::info!("feed connected");
        self.set_status(ConnectionState::Connected);
    }

    /// Decode and append one inbound payload. Malformed payloads are logged
    /// and discarded; the subscription and status are untouched.
    pub fn on_payload(&mut self, payload: &str) -> bool {
        if self.paused || self.disposed {
            return false;
        }
        let received_at = self.receipt_time();
        let seq = &mut self.fallback_seq;
        let decoded = decode_payload(payload, received_at, || {
            *seq += 1;
            format!("{}-{}", received_at.timestamp_millis(), seq)
        });
        match decoded {
            Ok(event) => self.append(event),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed stream message");
                false
            }
        }
    }

    /// The external stream failed or closed: drop it, go `disconnected`, and
    /// schedule one retry. Ignored for the synthetic source.
    pub fn on_transport_error(&mut self, reason: &str) {
        if self.paused || self.disposed {
            return;
        }
        if self.mode == FeedMode::Synthetic {
            tracing::warn!(%reason, "transport error ignored in synthetic mode");
            return;
        }
        tracing::warn!(%reason, retry_in = ?self.settings.retry_delay, "feed disconnected");
        self.release();
        self.set_status(ConnectionState::Disconnected);
        self.schedule_retry();
    }

    fn on_retry_due(&mut self) {
        self.retry = None;
        if self.paused || self.disposed || self.status != ConnectionState::Disconnected {
            return;
        }
        tracing::info!("retrying feed connection");
        self.acquire();
    }

    // ── Source management ──────────────────────────────────────────────────

    fn acquire(&mut self) {
        self.release();
        let epoch = self.epoch;
        let tx = self.tx.clone();

        match &self.mode {
            FeedMode::Synthetic => {
                let period = self.settings.tick.max(Duration::from_millis(1));
                self.source = Some(tokio::spawn(run_synthetic(tx, epoch, period)));
                self.set_status(ConnectionState::Connected);
                tracing::debug!(?period, epoch, "synthetic source armed");
            }
            FeedMode::External(endpoint) => {
                let connector = Arc::clone(&self.connector);
                let endpoint = endpoint.clone();
                tracing::debug!(%endpoint, epoch, "subscribing to event stream");
                self.source = Some(tokio::spawn(run_external(connector, endpoint, tx, epoch)));
                self.set_status(ConnectionState::Connecting);
            }
        }
    }

    /// Abort the source task and any pending retry, and invalidate every
    /// signal they may already have queued. Safe to call repeatedly.
    fn release(&mut self) {
        if let Some(task) = self.source.take() {
            task.abort();
        }
        if let Some(task) = self.retry.take() {
            task.abort();
        }
        self.epoch += 1;
    }

    fn schedule_retry(&mut self) {
        if let Some(task) = self.retry.take() {
            task.abort();
        }
        let tx = self.tx.clone();
        let epoch = self.epoch;
        let delay = self.settings.retry_delay;
        self.retry = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Envelope {
                epoch,
                signal: SourceSignal::RetryDue,
            });
        }));
    }

    fn set_status(&mut self, status: ConnectionState) {
        if self.status != status {
            tracing::debug!(from = %self.status, to = %status, "connection state");
            self.status = status;
            self.transitions.push(status);
        }
    }

    /// Wall-clock now, never earlier than the newest buffered event.
    fn receipt_time(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.buffer.back() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// Source tasks
// ---------------------------------------------------------------------------

async fn run_synthetic(tx: mpsc::UnboundedSender<Envelope>, epoch: u64, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let sent = tx.send(Envelope {
            epoch,
            signal: SourceSignal::Tick,
        });
        if sent.is_err() {
            break;
        }
    }
}

async fn run_external(
    connector: Arc<dyn StreamConnector>,
    endpoint: String,
    tx: mpsc::UnboundedSender<Envelope>,
    epoch: u64,
) {
    let send = |signal: SourceSignal| tx.send(Envelope { epoch, signal }).is_ok();

    let mut stream = match connector.connect(&endpoint).await {
        Ok(stream) => stream,
        Err(e) => {
            send(SourceSignal::Failed(e.to_string()));
            return;
        }
    };
    if !send(SourceSignal::Opened) {
        return;
    }

    while let Some(item) = stream.next().await {
        match item {
            Ok(payload) => {
                if !send(SourceSignal::Payload(payload)) {
                    return;
                }
            }
            Err(e) => {
                send(SourceSignal::Failed(e.to_string()));
                return;
            }
        }
    }
    send(SourceSignal::Failed(FeedError::Closed.to_string()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
