//! The trade panel — feed consumer, filter controller, and exposed state.
//!
//! `PanelState` is the single-owner pipeline core: the ring buffer, both
//! throttle gates, and the filter/loading/error fields, mutated only from
//! one task. `TradePanel` is the async shell around it — it owns the feed
//! connection and a background task that pumps socket events, REST snapshot
//! results, and throttle deadlines into the state.

use std::sync::Arc;
use std::time::Duration;

use async_lock::RwLock;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::trade::{Trade, TradeHistory};
use crate::error::HttpError;
use crate::feed::throttle::ThrottleGate;
use crate::http::MarketHttp;
use crate::shared::TradeSizeBucket;
use crate::ws::native::WsClient;
use crate::ws::{FeedMessage, WsConfig, WsEvent};

// ─── Config ──────────────────────────────────────────────────────────────────

/// Configuration for a trade panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelConfig {
    /// Ring buffer capacity and REST snapshot limit.
    pub max_trades: usize,
    /// Minimum interval between applied updates of one kind.
    pub throttle_window: Duration,
    /// Initial trade size filter.
    pub filter: TradeSizeBucket,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            max_trades: crate::domain::trade::state::DEFAULT_CAPACITY,
            throttle_window: Duration::from_millis(200),
            filter: TradeSizeBucket::All,
        }
    }
}

// ─── Exposed state ───────────────────────────────────────────────────────────

/// Lifecycle phase of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    /// Panel closed; buffer and filter retained but dormant.
    Closed,
    /// Waiting on the initial REST snapshot for the current filter.
    Loading,
    /// Live.
    Open,
}

/// Everything the render consumer sees. Derived state only — no handles.
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    /// Up to `max_trades` records, newest-first by arrival.
    pub trades: Vec<Trade>,
    pub loading: bool,
    pub error: Option<String>,
    pub filter: TradeSizeBucket,
    pub phase: PanelPhase,
}

// ─── PanelState ──────────────────────────────────────────────────────────────

/// The pipeline core. Single-owner: only ever mutated by one task, so the
/// buffer cap is enforced synchronously and no torn reads are possible.
#[derive(Debug)]
pub struct PanelState {
    history: TradeHistory,
    snapshot_gate: ThrottleGate<Vec<Trade>>,
    trade_gate: ThrottleGate<Trade>,
    loading: bool,
    error: Option<String>,
    filter: TradeSizeBucket,
    phase: PanelPhase,
    /// Bumped on every fetch; stale completions are dropped against it.
    generation: u64,
}

impl PanelState {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            history: TradeHistory::new(config.max_trades),
            snapshot_gate: ThrottleGate::new(config.throttle_window),
            trade_gate: ThrottleGate::new(config.throttle_window),
            loading: false,
            error: None,
            filter: config.filter,
            phase: PanelPhase::Closed,
            generation: 0,
        }
    }

    /// Whether an incoming trade passes the current size filter.
    ///
    /// The live socket is an unfiltered firehose; the filter is applied
    /// here, at admission. Trades with no native side have no XRP size and
    /// only pass the `All` bucket.
    pub fn admits(&self, trade: &Trade) -> bool {
        match self.filter {
            TradeSizeBucket::All => true,
            bucket => trade
                .size_in_xrp()
                .is_some_and(|size| size >= bucket.threshold()),
        }
    }

    /// Feed a decoded socket message through the throttle stage.
    pub fn handle_message(&mut self, msg: FeedMessage, now: Instant) {
        match msg {
            FeedMessage::Snapshot(records) => {
                let trades: Vec<Trade> = records
                    .into_iter()
                    .map(Trade::from)
                    .filter(|t| self.admits(t))
                    .collect();
                if let Some(trades) = self.snapshot_gate.offer(trades, now) {
                    self.history.replace(trades);
                }
            }
            FeedMessage::Trade(record) => {
                let trade = Trade::from(*record);
                if !self.admits(&trade) {
                    return;
                }
                if let Some(trade) = self.trade_gate.offer(trade, now) {
                    self.history.prepend(trade);
                }
            }
        }
    }

    /// Apply any throttled update whose deadline has passed.
    pub fn flush_due(&mut self, now: Instant) {
        if let Some(trades) = self.snapshot_gate.take_due(now) {
            self.history.replace(trades);
        }
        if let Some(trade) = self.trade_gate.take_due(now) {
            self.history.prepend(trade);
        }
    }

    /// The earliest pending throttle deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.snapshot_gate.deadline(), self.trade_gate.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Start a fresh snapshot load for the current filter.
    ///
    /// Returns the generation the eventual completion must present.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.phase = PanelPhase::Loading;
        self.snapshot_gate.cancel();
        self.trade_gate.cancel();
        self.generation
    }

    /// Switch the size filter: invalidate the buffer and start a fresh load.
    pub fn begin_filter(&mut self, bucket: TradeSizeBucket) -> u64 {
        self.filter = bucket;
        self.history.clear();
        self.begin_load()
    }

    /// Apply a finished REST snapshot fetch. Completions carrying a stale
    /// generation (an old filter's in-flight fetch) are dropped.
    pub fn complete_fetch(&mut self, generation: u64, result: Result<Vec<Trade>, HttpError>) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Dropping stale snapshot fetch"
            );
            return;
        }
        self.loading = false;
        match result {
            Ok(trades) => {
                self.history.replace(trades);
                self.phase = PanelPhase::Open;
            }
            Err(e) => {
                // Empty buffer beats stale rows from another filter.
                self.history.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    /// Transport dropped; a reconnect is underway. Buffer keeps rendering.
    pub fn connection_lost(&mut self, reason: &str) {
        self.error = Some(format!("Connection error: {}", reason));
    }

    pub fn connection_restored(&mut self) {
        self.error = None;
    }

    /// Panel closed by the user: cancel deferred work, keep the buffer and
    /// filter dormant for the next open.
    pub fn suspend(&mut self) {
        self.snapshot_gate.cancel();
        self.trade_gate.cancel();
        self.loading = false;
        self.phase = PanelPhase::Closed;
    }

    pub fn set_filter_dormant(&mut self, bucket: TradeSizeBucket) {
        self.filter = bucket;
        self.history.clear();
    }

    pub fn filter(&self) -> TradeSizeBucket {
        self.filter
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn history(&self) -> &TradeHistory {
        &self.history
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            trades: self.history.trades().iter().cloned().collect(),
            loading: self.loading,
            error: self.error.clone(),
            filter: self.filter,
            phase: self.phase,
        }
    }
}

// ─── TradePanel ──────────────────────────────────────────────────────────────

enum PanelCommand {
    SetFilter(TradeSizeBucket),
    Close,
}

type FetchResult = (u64, Result<Vec<Trade>, HttpError>);

/// Async shell around [`PanelState`]: owns the feed connection and the
/// background task that drives the pipeline while the panel is open.
pub struct TradePanel {
    shared: Arc<RwLock<PanelState>>,
    config: PanelConfig,
    http: MarketHttp,
    ws_config: WsConfig,
    cmd_tx: Option<mpsc::Sender<PanelCommand>>,
    task_handle: Option<JoinHandle<()>>,
}

impl TradePanel {
    pub fn new(http: MarketHttp, ws_config: WsConfig, config: PanelConfig) -> Self {
        Self {
            shared: Arc::new(RwLock::new(PanelState::new(config))),
            config,
            http,
            ws_config,
            cmd_tx: None,
            task_handle: None,
        }
    }

    /// Open the panel: connect the feed and fetch the initial snapshot for
    /// the retained filter. No-op if already open.
    pub async fn open(&mut self) {
        if self.cmd_tx.is_some() {
            return;
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        self.cmd_tx = Some(cmd_tx);

        let handle = tokio::spawn(run_panel(
            Arc::clone(&self.shared),
            cmd_rx,
            self.http.clone(),
            self.ws_config.clone(),
            self.config,
        ));
        self.task_handle = Some(handle);
    }

    /// Close the panel: tear down the socket, cancel the pending reconnect
    /// timer and any throttled-but-unapplied update. The buffer and filter
    /// are retained for the next `open()`. Idempotent.
    pub async fn close(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(PanelCommand::Close).await;
        }
        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    /// Select a minimum trade size. While open this clears the buffer and
    /// re-fetches; while closed it just records the choice for next open.
    pub async fn set_filter(&self, bucket: TradeSizeBucket) {
        if let Some(tx) = &self.cmd_tx {
            if tx.send(PanelCommand::SetFilter(bucket)).await.is_ok() {
                return;
            }
        }
        self.shared.write().await.set_filter_dormant(bucket);
    }

    pub fn is_open(&self) -> bool {
        self.cmd_tx.is_some()
    }

    /// The full state the render consumer needs, as one consistent read.
    pub async fn snapshot(&self) -> PanelSnapshot {
        self.shared.read().await.snapshot()
    }
}

impl Drop for TradePanel {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_panel(
    shared: Arc<RwLock<PanelState>>,
    mut cmd_rx: mpsc::Receiver<PanelCommand>,
    http: MarketHttp,
    ws_config: WsConfig,
    config: PanelConfig,
) {
    let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchResult>(4);

    // Initial snapshot for the retained filter.
    let (generation, filter) = {
        let mut state = shared.write().await;
        let generation = state.begin_load();
        (generation, state.filter())
    };
    spawn_fetch(&http, filter, config.max_trades, generation, &fetch_tx);

    let mut ws = WsClient::new(ws_config);
    // connect() only spawns the connection task; failures surface as events.
    let _ = ws.connect().await;

    {
        let events = ws.events();
        tokio::pin!(events);

        loop {
            let deadline = shared.read().await.next_deadline();
            let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(86400));

            tokio::select! {
                ev = events.next() => {
                    match ev {
                        Some(WsEvent::Message(msg)) => {
                            shared.write().await.handle_message(msg, Instant::now());
                        }
                        Some(WsEvent::Connected) => {
                            shared.write().await.connection_restored();
                        }
                        Some(WsEvent::Disconnected { reason, .. }) => {
                            shared.write().await.connection_lost(&reason);
                        }
                        Some(WsEvent::Error(reason)) => {
                            shared.write().await.connection_lost(&reason);
                        }
                        None => break,
                    }
                }

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(PanelCommand::SetFilter(bucket)) => {
                            let generation = shared.write().await.begin_filter(bucket);
                            spawn_fetch(&http, bucket, config.max_trades, generation, &fetch_tx);
                        }
                        Some(PanelCommand::Close) | None => break,
                    }
                }

                res = fetch_rx.recv() => {
                    if let Some((generation, result)) = res {
                        shared.write().await.complete_fetch(generation, result);
                    }
                }

                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    shared.write().await.flush_due(Instant::now());
                }
            }
        }
    }

    ws.disconnect().await.ok();
    shared.write().await.suspend();
}

fn spawn_fetch(
    http: &MarketHttp,
    filter: TradeSizeBucket,
    limit: usize,
    generation: u64,
    tx: &mpsc::Sender<FetchResult>,
) {
    let http = http.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = http
            .get_trades(filter, Some(limit as u32), None)
            .await
            .map(|wires| wires.into_iter().map(Trade::from).collect());
        let _ = tx.send((generation, result)).await;
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{AccountId, Amount};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn xrp_trade(size: i64) -> Trade {
        Trade {
            timestamp: Utc::now(),
            paid: Amount::native(Decimal::from(size)),
            got: Amount::issued("NFT", AccountId::from("rIssuer"), Decimal::ONE),
            maker: AccountId::from("rMaker"),
            taker: AccountId::from("rTaker"),
            tx_hash: None,
        }
    }

    fn token_trade() -> Trade {
        Trade {
            timestamp: Utc::now(),
            paid: Amount::issued("AAA", AccountId::from("rA"), Decimal::ONE),
            got: Amount::issued("BBB", AccountId::from("rB"), Decimal::ONE),
            maker: AccountId::from("rMaker"),
            taker: AccountId::from("rTaker"),
            tx_hash: None,
        }
    }

    fn state_with_filter(bucket: TradeSizeBucket) -> PanelState {
        let mut state = PanelState::new(PanelConfig {
            filter: bucket,
            ..PanelConfig::default()
        });
        let generation = state.begin_load();
        state.complete_fetch(generation, Ok(vec![]));
        state
    }

    #[test]
    fn test_admits_all_bucket_takes_everything() {
        let state = state_with_filter(TradeSizeBucket::All);
        assert!(state.admits(&xrp_trade(1)));
        assert!(state.admits(&token_trade()));
    }

    #[test]
    fn test_admits_threshold_excludes_small_trades() {
        let state = state_with_filter(TradeSizeBucket::Xrp1000);
        assert!(state.admits(&xrp_trade(1000)));
        assert!(state.admits(&xrp_trade(5000)));
        assert!(!state.admits(&xrp_trade(999)));
    }

    #[test]
    fn test_admits_token_trade_only_under_all() {
        let state = state_with_filter(TradeSizeBucket::Xrp500);
        assert!(!state.admits(&token_trade()));
    }

    #[test]
    fn test_stale_fetch_completion_dropped() {
        let mut state = PanelState::new(PanelConfig::default());
        let old = state.begin_load();
        let current = state.begin_filter(TradeSizeBucket::Xrp500);
        assert_ne!(old, current);

        // The old filter's response lands late — must not populate anything.
        state.complete_fetch(old, Ok(vec![xrp_trade(1)]));
        assert!(state.history().is_empty());
        assert_eq!(state.snapshot().loading, true);

        state.complete_fetch(current, Ok(vec![xrp_trade(600)]));
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.snapshot().loading, false);
        assert_eq!(state.phase(), PanelPhase::Open);
    }

    #[test]
    fn test_fetch_failure_leaves_buffer_empty() {
        let mut state = PanelState::new(PanelConfig::default());
        let generation = state.begin_load();
        state.complete_fetch(
            generation,
            Err(HttpError::ServerError {
                status: 500,
                body: "boom".into(),
            }),
        );
        assert!(state.history().is_empty());
        assert!(!state.snapshot().loading);
        assert!(state.snapshot().error.is_some());
        assert_eq!(state.phase(), PanelPhase::Loading);
    }

    #[test]
    fn test_connection_error_transient() {
        let mut state = state_with_filter(TradeSizeBucket::All);
        state.handle_message(
            FeedMessage::Snapshot(vec![]),
            Instant::now(),
        );
        state.connection_lost("broken pipe");
        assert!(state.snapshot().error.is_some());
        // Reconnect succeeded: the banner clears, phase untouched.
        state.connection_restored();
        assert!(state.snapshot().error.is_none());
        assert_eq!(state.phase(), PanelPhase::Open);
    }

    #[test]
    fn test_suspend_retains_buffer_and_filter() {
        let mut state = state_with_filter(TradeSizeBucket::Xrp500);
        state.handle_message(
            FeedMessage::Trade(Box::new(wire(600))),
            Instant::now(),
        );
        assert_eq!(state.history().len(), 1);

        state.suspend();
        assert_eq!(state.phase(), PanelPhase::Closed);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.filter(), TradeSizeBucket::Xrp500);
    }

    fn wire(size: i64) -> crate::domain::trade::wire::TradeWire {
        use crate::domain::trade::wire::{AmountWire, TradeWire};
        TradeWire {
            timestamp: Utc::now(),
            paid: AmountWire {
                currency: "XRP".into(),
                issuer: None,
                value: Decimal::from(size),
            },
            got: AmountWire {
                currency: "NFT".into(),
                issuer: Some(AccountId::from("rIssuer")),
                value: Decimal::ONE,
            },
            maker: AccountId::from("rMaker"),
            taker: AccountId::from("rTaker"),
            hash: None,
        }
    }
}
