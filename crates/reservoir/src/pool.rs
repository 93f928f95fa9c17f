//! The connection pool engine
//!
//! A bounded pool of physical database connections with:
//! - LIFO idle store and demand-driven background creation
//! - Borrow-time, return-time, and idle-time validity checking
//! - Periodic eviction with an idle floor and keep-alive refresh
//!
//! # Example
//!
//! ```rust,ignore
//! use reservoir::prelude::*;
//!
//! let config = PoolConfig::new("mysql://app:secret@db:3306/orders")
//!     .with_max_active(16)
//!     .with_min_idle(4)
//!     .with_keep_alive(true);
//!
//! let pool = ConnectionPool::new(config, Arc::new(MyFactory));
//! pool.initialize().await?;
//!
//! let mut conn = pool.get().await?;
//! conn.query("SELECT 1", None).await?;
//! conn.close().await?;
//! ```
//!
//! All coordination happens through one mutex around the pool state and two
//! notifications: `idle_available` wakes borrowers when a connection enters
//! the idle store, `target_nudge` wakes the creator task when demand or
//! capacity changes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{oneshot, Mutex, Notify};
use tracing::{debug, error, info, warn};

use crate::checker::{CheckerRegistry, ValidityChecker};
use crate::config::{AtomicPoolStats, PoolConfig, PoolStats};
use crate::connection::{redact_url, Connection, ConnectionFactory};
use crate::error::{Error, Result};
use crate::handle::PooledConnection;
use crate::holder::ConnectionHolder;

/// Consecutive connect failures after which `initialize` gives up
const INIT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
/// Pause before retrying a failed connect
const CREATE_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// State behind the pool lock
struct PoolState {
    /// Idle connections; back is most recently returned, front is oldest
    idle: VecDeque<Arc<ConnectionHolder>>,
    /// Connections counted as borrowed
    active_count: usize,
    /// Keep-alive candidates off the idle store for revalidation, still
    /// owned by the pool and counted against capacity
    revalidating_count: usize,
}

/// Live-waiter counter that survives cancelled borrow futures
struct WaitGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> WaitGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Whether an idle span crosses the check threshold
///
/// A last-use stamp ahead of `now` means a touch raced this snapshot; it
/// counts as past the threshold rather than fresh.
fn idle_past_threshold(now_ms: u64, last_ms: u64, threshold_ms: u64) -> bool {
    now_ms < last_ms || now_ms - last_ms >= threshold_ms
}

/// Bounded, validating connection pool
pub struct ConnectionPool {
    config: PoolConfig,
    factory: Arc<dyn ConnectionFactory>,
    checker: Option<Arc<dyn ValidityChecker>>,
    /// Reference instant for all holder timestamps
    epoch: Instant,
    state: Mutex<PoolState>,
    /// Borrowers park here while the idle store is empty
    idle_available: Notify,
    /// The creator task parks here while it has nothing to do
    target_nudge: Notify,
    /// Wakes the evictor out of its sleep on close
    shutdown_notify: Notify,
    waiting: AtomicUsize,
    init_lock: Mutex<bool>,
    init_done: AtomicBool,
    shutdown: AtomicBool,
    stats: AtomicPoolStats,
}

impl ConnectionPool {
    /// Create a pool with the default vendor checker registry
    ///
    /// The pool does not dial anything until [`initialize`](Self::initialize)
    /// is called.
    pub fn new(config: PoolConfig, factory: Arc<dyn ConnectionFactory>) -> Arc<Self> {
        Self::with_registry(config, factory, CheckerRegistry::with_defaults())
    }

    /// Create a pool resolving the validity checker from `registry`
    pub fn with_registry(
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory>,
        registry: CheckerRegistry,
    ) -> Arc<Self> {
        let checker = registry.get(config.effective_vendor());
        Self::build(config, factory, checker)
    }

    /// Create a pool with an explicit validity checker
    ///
    /// Takes precedence over any registry lookup.
    pub fn with_checker(
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory>,
        checker: Arc<dyn ValidityChecker>,
    ) -> Arc<Self> {
        Self::build(config, factory, Some(checker))
    }

    fn build(
        config: PoolConfig,
        factory: Arc<dyn ConnectionFactory>,
        checker: Option<Arc<dyn ValidityChecker>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            factory,
            checker,
            epoch: Instant::now(),
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                active_count: 0,
                revalidating_count: 0,
            }),
            idle_available: Notify::new(),
            target_nudge: Notify::new(),
            shutdown_notify: Notify::new(),
            waiting: AtomicUsize::new(0),
            init_lock: Mutex::new(false),
            init_done: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            stats: AtomicPoolStats::new(),
        })
    }

    /// The pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Validate the configuration, fill the idle store, and start the
    /// creator and evictor tasks
    ///
    /// Must complete before any borrow. Calling it again is a no-op; a
    /// configuration violation or a persistently unreachable database fails
    /// startup.
    pub async fn initialize(self: &Arc<Self>) -> Result<()> {
        let mut inited = self.init_lock.lock().await;
        if *inited {
            return Ok(());
        }
        if self.shutdown.load(Ordering::Acquire) {
            return Err(Error::closed("pool is closed"));
        }

        self.config.validate()?;
        self.validation_probe_check();

        // Synchronous fill so the first borrower finds warm connections.
        let target = self.config.initial_fill_target();
        let mut filled: Vec<Arc<ConnectionHolder>> = Vec::with_capacity(target);
        let mut consecutive_failures = 0u32;
        while filled.len() < target {
            match self.dial().await {
                Ok(holder) => {
                    consecutive_failures = 0;
                    filled.push(holder);
                }
                Err(err) => {
                    consecutive_failures += 1;
                    error!(
                        url = %redact_url(&self.config.url),
                        error = %err,
                        "initial connection failed"
                    );
                    if consecutive_failures >= INIT_MAX_CONSECUTIVE_FAILURES {
                        self.close_holders(filled).await;
                        return Err(err);
                    }
                    tokio::time::sleep(CREATE_RETRY_BACKOFF).await;
                }
            }
        }

        if self.shutdown.load(Ordering::Acquire) {
            self.close_holders(filled).await;
            return Err(Error::closed("pool closed during initialization"));
        }

        let initial = filled.len();
        {
            let mut state = self.state.lock().await;
            state.idle.extend(filled);
        }

        let (creator_ready_tx, creator_ready_rx) = oneshot::channel();
        let (evictor_ready_tx, evictor_ready_rx) = oneshot::channel();
        Arc::clone(self).spawn_creator(creator_ready_tx);
        Arc::clone(self).spawn_evictor(evictor_ready_tx);
        // Both tasks are running before the first borrow is served.
        let _ = creator_ready_rx.await;
        let _ = evictor_ready_rx.await;

        *inited = true;
        self.init_done.store(true, Ordering::Release);
        info!(
            url = %redact_url(&self.config.url),
            initial,
            max_active = self.config.max_active,
            "connection pool initialized"
        );
        Ok(())
    }

    /// Warn when validation is requested but nothing can perform it
    fn validation_probe_check(&self) {
        let flags = self.config.enabled_test_flags();
        if flags.is_empty() {
            return;
        }
        if self.checker.is_some() || self.config.validation_query.is_some() {
            return;
        }
        warn!(
            flags = ?flags,
            "validation flags set but neither a validation query nor a vendor checker is available"
        );
    }

    /// Dial one physical connection and wrap it in a holder
    async fn dial(&self) -> Result<Arc<ConnectionHolder>> {
        let settings = self.config.connect_settings();
        let conn = self.factory.connect(&settings).await?;
        self.stats.record_created();
        Ok(Arc::new(ConnectionHolder::new(conn, self.epoch)))
    }

    async fn close_holders(&self, holders: Vec<Arc<ConnectionHolder>>) {
        for holder in holders {
            if let Err(err) = holder.connection().close().await {
                debug!(error = %err, "error closing connection");
            }
            self.stats.record_closed();
        }
    }

    /// Borrow a connection, waiting per the configured `max_wait`
    pub async fn get(self: &Arc<Self>) -> Result<PooledConnection> {
        self.get_with_wait(self.config.max_wait).await
    }

    /// Borrow a connection with an explicit wait bound
    ///
    /// `None` waits until a connection becomes available. The bound covers
    /// the whole call: when a candidate fails validation the retry continues
    /// against the same deadline.
    pub async fn get_with_wait(
        self: &Arc<Self>,
        max_wait: Option<Duration>,
    ) -> Result<PooledConnection> {
        if !self.init_done.load(Ordering::Acquire) {
            return Err(Error::config("pool not initialized, call initialize() first"));
        }

        let started = Instant::now();
        let deadline = max_wait.map(|wait| started + wait);

        loop {
            let holder = self.take_idle(max_wait, deadline).await?;

            if self.validate_on_borrow(&holder).await {
                holder.touch_active();
                self.stats
                    .record_borrow(started.elapsed().as_millis() as u64);
                return Ok(PooledConnection::new(Arc::clone(self), holder));
            }

            debug!("skip invalid connection");
            self.discard(holder).await;
        }
    }

    /// Pop the most recently returned idle holder, waiting when none exists
    async fn take_idle(
        &self,
        max_wait: Option<Duration>,
        deadline: Option<Instant>,
    ) -> Result<Arc<ConnectionHolder>> {
        let mut state = self.state.lock().await;
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return Err(Error::closed("pool is closed"));
            }

            if let Some(holder) = state.idle.pop_back() {
                // Best-effort accounting; at saturation the borrow proceeds
                // untracked rather than blocking.
                if state.active_count < self.config.max_active {
                    state.active_count += 1;
                    holder.set_active(true);
                }
                // The vacancy may warrant a replacement when borrowers queue.
                self.target_nudge.notify_waiters();
                return Ok(holder);
            }

            let wait_guard = WaitGuard::new(&self.waiting);
            self.target_nudge.notify_waiters();

            let notified = self.idle_available.notified();
            tokio::pin!(notified);
            // Register interest while still holding the lock so a wakeup
            // between unlock and await is not lost.
            notified.as_mut().enable();
            drop(state);

            // A close that slipped in before the registration above would
            // have notified nobody.
            if self.shutdown.load(Ordering::Acquire) {
                return Err(Error::closed("pool is closed"));
            }

            let timed_out = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        true
                    } else {
                        tokio::time::timeout(remaining, notified.as_mut())
                            .await
                            .is_err()
                    }
                }
                None => {
                    notified.as_mut().await;
                    false
                }
            };

            state = self.state.lock().await;
            drop(wait_guard);

            if timed_out && state.idle.is_empty() {
                self.stats.record_timeout();
                return Err(Error::timeout(format!(
                    "borrow wait of {:?} exhausted, active {}, idle {}, waiting {}",
                    max_wait.unwrap_or_default(),
                    state.active_count,
                    state.idle.len(),
                    self.waiting.load(Ordering::SeqCst),
                )));
            }
        }
    }

    /// Borrow-time validation policy
    async fn validate_on_borrow(&self, holder: &Arc<ConnectionHolder>) -> bool {
        let conn = holder.connection();

        if self.config.test_on_borrow {
            return self.test_connection(holder, conn.as_ref()).await;
        }

        if conn.is_closed() {
            return false;
        }

        if self.config.test_while_idle {
            let now = holder.now_millis();
            let last = holder.effective_last_active_millis(self.config.check_execute_time);
            let threshold = self.config.idle_check_threshold().as_millis() as u64;
            if idle_past_threshold(now, last, threshold) {
                return self.test_connection(holder, conn.as_ref()).await;
            }
        }

        true
    }

    /// Run the validity probe for one connection
    ///
    /// Never propagates driver errors; any failure reports the connection as
    /// invalid and the caller owns the discard.
    pub(crate) async fn test_connection(
        &self,
        holder: &ConnectionHolder,
        conn: &dyn Connection,
    ) -> bool {
        let query = self.config.validation_query.as_deref();
        let timeout = self.config.validation_query_timeout;

        if let Some(checker) = &self.checker {
            let valid = match checker.is_valid(conn, query, timeout).await {
                Ok(valid) => valid,
                Err(err) => {
                    debug!(error = %err, "validity check failed");
                    false
                }
            };
            holder.touch_valid();
            holder.touch_exec();

            if valid {
                if let Some(age_ms) = conn.millis_since_last_response() {
                    let threshold = self.config.idle_check_threshold().as_millis() as u64;
                    if age_ms >= threshold {
                        warn!(
                            url = %redact_url(&self.config.url),
                            last_response_ms = age_ms,
                            "connection has not heard from the server for too long"
                        );
                        return false;
                    }
                }
            }
            return valid;
        }

        if conn.is_closed() {
            return false;
        }

        let Some(query) = query else {
            return true;
        };

        match conn.query(query, timeout).await {
            Ok(rows) => !rows.is_empty(),
            Err(err) => {
                debug!(error = %err, "validation query failed");
                false
            }
        }
    }

    /// Return a borrowed holder to the pool
    ///
    /// Dead connections only give back their accounting slot; a return-time
    /// validation failure discards the connection. Otherwise the holder
    /// re-enters the idle store and one push wakes all parked borrowers.
    pub(crate) async fn recycle(&self, holder: Arc<ConnectionHolder>) {
        let conn = Arc::clone(holder.connection());

        if conn.is_closed() {
            self.release_accounting(&holder).await;
            self.stats.record_closed();
            self.target_nudge.notify_waiters();
            return;
        }

        if self.config.test_on_return {
            let valid = self.test_connection(&holder, conn.as_ref()).await;
            if !valid {
                debug!("discard connection failing return-time validation");
                self.discard(holder).await;
                return;
            }
        }

        holder.touch_active();
        let mut state = self.state.lock().await;
        if holder.is_active() {
            holder.set_active(false);
            state.active_count = state.active_count.saturating_sub(1);
        }
        // Checked under the store lock: when the flag is clear here, any
        // in-flight close() has yet to drain and will collect this push.
        if self.shutdown.load(Ordering::Acquire) {
            // Late return after close: shut the connection down instead of
            // re-pooling it.
            drop(state);
            if let Err(err) = conn.close().await {
                debug!(error = %err, "error closing returned connection");
            }
            self.stats.record_closed();
            return;
        }
        state.idle.push_back(holder);
        drop(state);
        self.idle_available.notify_waiters();
    }

    /// Close a connection that failed validation and fix the accounting
    pub(crate) async fn discard(&self, holder: Arc<ConnectionHolder>) {
        let conn = Arc::clone(holder.connection());
        if let Err(err) = conn.close().await {
            debug!(error = %err, "error closing discarded connection");
        }
        self.stats.record_closed();
        self.stats.record_discard();

        self.release_accounting(&holder).await;
        // Capacity freed; the creator may have work now.
        self.target_nudge.notify_waiters();
    }

    /// Give back the active slot held by a departing holder
    async fn release_accounting(&self, holder: &ConnectionHolder) {
        let mut state = self.state.lock().await;
        if holder.is_active() {
            holder.set_active(false);
            state.active_count = state.active_count.saturating_sub(1);
        }
    }

    /// Trim the idle store down to `min_idle`, oldest first
    ///
    /// Manual operation; the periodic evictor applies the time-based policy
    /// instead.
    pub async fn shrink(&self) {
        self.shrink_with(false, false).await;
    }

    /// Eviction sweep
    ///
    /// With `check_time`, classifies idle connections by idle age: evictable
    /// above the floor past `min_evictable_idle`, unconditionally evictable
    /// past `max_evictable_idle`, keep-alive refresh past
    /// `keep_alive_between`. Without it, simply trims the store down to
    /// `min_idle`.
    pub(crate) async fn shrink_with(&self, check_time: bool, keep_alive: bool) {
        if !self.init_done.load(Ordering::Acquire) {
            return;
        }

        let mut evict: Vec<Arc<ConnectionHolder>> = Vec::new();
        let mut keep: Vec<Arc<ConnectionHolder>> = Vec::new();
        let needs_fill;

        {
            let mut state = self.state.lock().await;
            let check_count = state.idle.len().saturating_sub(self.config.min_idle);
            let now = self.epoch.elapsed().as_millis() as u64;
            let min_evictable = self.config.min_evictable_idle.as_millis() as u64;
            let max_evictable = self.config.max_evictable_idle.as_millis() as u64;
            let keep_alive_between = self.config.keep_alive_between.as_millis() as u64;

            let mut marked = vec![false; state.idle.len()];
            for (i, holder) in state.idle.iter().enumerate() {
                if check_time {
                    let idle_ms = holder.idle_millis(now);

                    // The store is scanned oldest-first; once a connection is
                    // too young for either policy the rest are younger still.
                    if idle_ms < min_evictable && idle_ms < keep_alive_between {
                        break;
                    }

                    if idle_ms >= min_evictable {
                        if i < check_count {
                            evict.push(Arc::clone(holder));
                            marked[i] = true;
                            continue;
                        } else if idle_ms > max_evictable {
                            evict.push(Arc::clone(holder));
                            marked[i] = true;
                            continue;
                        }
                    }

                    if keep_alive && idle_ms >= keep_alive_between {
                        keep.push(Arc::clone(holder));
                        marked[i] = true;
                    }
                } else if i < check_count {
                    evict.push(Arc::clone(holder));
                    marked[i] = true;
                } else {
                    break;
                }
            }

            // Marked holders are a prefix of the scan in age-ordered stores;
            // rebuilding positionally stays exact when keep-alive re-pushes
            // have perturbed that order.
            if evict.len() + keep.len() > 0 {
                let old = std::mem::take(&mut state.idle);
                for (i, holder) in old.into_iter().enumerate() {
                    if !marked.get(i).copied().unwrap_or(false) {
                        state.idle.push_back(holder);
                    }
                }
            }

            // Candidates stay owned by the pool while off the list; the
            // creator's capacity gate and the floor checks count them until
            // they re-enter or close.
            state.revalidating_count += keep.len();

            needs_fill = keep_alive
                && state.idle.len() + state.active_count + state.revalidating_count
                    < self.config.min_idle;
        }

        if !evict.is_empty() {
            let evicted = evict.len() as u64;
            for holder in evict {
                if let Err(err) = holder.connection().close().await {
                    debug!(error = %err, "error closing evicted connection");
                }
                self.stats.record_closed();
            }
            self.stats.record_evicted(evicted);
            debug!(evicted, "evicted idle connections");
        }

        if !keep.is_empty() {
            // Revalidate newest-first so the oldest survivor re-enters last
            // and is borrowed first.
            for holder in keep.iter().rev() {
                let conn = Arc::clone(holder.connection());
                let valid = self.test_connection(holder, conn.as_ref()).await;
                holder.touch_keep();

                if valid {
                    let repooled = {
                        let mut state = self.state.lock().await;
                        state.revalidating_count = state.revalidating_count.saturating_sub(1);
                        if self.shutdown.load(Ordering::Acquire) {
                            false
                        } else {
                            state.idle.push_back(Arc::clone(holder));
                            true
                        }
                    };
                    if repooled {
                        self.idle_available.notify_one();
                        self.stats.record_keep_alive();
                    } else {
                        // A close landed mid-sweep and already drained the
                        // store; shut the candidate down instead of
                        // re-pooling it.
                        if let Err(err) = conn.close().await {
                            debug!(error = %err, "error closing keep-alive connection after shutdown");
                        }
                        self.stats.record_closed();
                    }
                } else {
                    if let Err(err) = conn.close().await {
                        debug!(error = %err, "error closing stale keep-alive connection");
                    }
                    self.stats.record_closed();

                    let below_floor = {
                        let mut state = self.state.lock().await;
                        state.revalidating_count = state.revalidating_count.saturating_sub(1);
                        state.idle.len() + state.active_count + state.revalidating_count
                            <= self.config.min_idle
                    };
                    if below_floor {
                        self.target_nudge.notify_waiters();
                    }
                }
            }
        }

        if needs_fill {
            self.target_nudge.notify_waiters();
        }
    }

    /// Whether the creator task should dial right now; called under the lock
    fn create_warranted(&self, state: &PoolState) -> bool {
        let total = state.idle.len() + state.active_count + state.revalidating_count;
        if total >= self.config.max_active {
            return false;
        }
        if self.waiting.load(Ordering::SeqCst) > 0 && state.idle.is_empty() {
            return true;
        }
        self.config.keep_alive && total < self.config.min_idle
    }

    fn spawn_creator(self: Arc<Self>, ready: oneshot::Sender<()>) {
        tokio::spawn(async move {
            let _ = ready.send(());
            debug!("creator task started");

            loop {
                if self.shutdown.load(Ordering::Acquire) {
                    break;
                }

                let state = self.state.lock().await;
                if !self.create_warranted(&state) {
                    let nudged = self.target_nudge.notified();
                    tokio::pin!(nudged);
                    // Register interest before releasing the lock so a nudge
                    // sent right after cannot be lost.
                    nudged.as_mut().enable();
                    drop(state);

                    let shutdown_wake = self.shutdown_notify.notified();
                    tokio::pin!(shutdown_wake);
                    shutdown_wake.as_mut().enable();
                    // Registered on both; a close before either registration
                    // shows up in the flag.
                    if self.shutdown.load(Ordering::Acquire) {
                        break;
                    }

                    tokio::select! {
                        biased;
                        () = shutdown_wake => {}
                        () = nudged => {}
                    }
                    continue;
                }
                drop(state);

                // Dial outside the lock; borrows and returns proceed
                // while the connect is in flight.
                match self.dial().await {
                    Ok(holder) => {
                        let mut state = self.state.lock().await;
                        if self.shutdown.load(Ordering::Acquire) {
                            drop(state);
                            if let Err(err) = holder.connection().close().await {
                                debug!(error = %err, "error closing connection after shutdown");
                            }
                            self.stats.record_closed();
                            break;
                        }
                        state.idle.push_back(holder);
                        debug!(idle = state.idle.len(), "created pooled connection");
                        drop(state);
                        self.idle_available.notify_waiters();
                    }
                    Err(err) => {
                        error!(
                            url = %redact_url(&self.config.url),
                            error = %err,
                            "create connection failed"
                        );
                        tokio::time::sleep(CREATE_RETRY_BACKOFF).await;
                    }
                }
            }

            debug!("creator task stopped");
        });
    }

    fn spawn_evictor(self: Arc<Self>, ready: oneshot::Sender<()>) {
        let period = self.config.evictor_period();
        tokio::spawn(async move {
            let _ = ready.send(());
            debug!(period_ms = period.as_millis() as u64, "evictor task started");

            loop {
                let shutdown_wake = self.shutdown_notify.notified();
                tokio::pin!(shutdown_wake);
                shutdown_wake.as_mut().enable();
                if self.shutdown.load(Ordering::Acquire) {
                    break;
                }

                tokio::select! {
                    biased;
                    () = shutdown_wake => {}
                    () = tokio::time::sleep(period) => {
                        self.shrink_with(true, self.config.keep_alive).await;
                    }
                }
            }

            debug!("evictor task stopped");
        });
    }

    /// Stop both background tasks, close all idle connections, and fail
    /// subsequent borrows
    ///
    /// Borrowed connections still out are closed as they come back. Calling
    /// `close` again is a no-op.
    pub async fn close(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        self.shutdown_notify.notify_waiters();
        self.target_nudge.notify_waiters();
        self.idle_available.notify_waiters();

        let drained: Vec<Arc<ConnectionHolder>> = {
            let mut state = self.state.lock().await;
            state.idle.drain(..).collect()
        };
        let closed = drained.len();
        self.close_holders(drained).await;

        info!(closed, "connection pool closed");
    }

    /// Point-in-time statistics
    pub async fn stats(&self) -> PoolStats {
        let state = self.state.lock().await;
        let mut stats = self.stats.snapshot();
        stats.idle = state.idle.len();
        stats.active = state.active_count;
        stats.waiting = self.waiting.load(Ordering::SeqCst);
        stats
    }

    /// Number of idle connections
    pub async fn idle_count(&self) -> usize {
        self.state.lock().await.idle.len()
    }

    /// Number of borrowed connections
    pub async fn active_count(&self) -> usize {
        self.state.lock().await.active_count
    }

    /// Number of borrowers currently waiting
    pub fn waiting_count(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Whether `initialize` has completed
    pub fn is_initialized(&self) -> bool {
        self.init_done.load(Ordering::Acquire)
    }

    /// Whether the pool has been closed
    pub fn is_closed(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("url", &redact_url(&self.config.url))
            .field("max_active", &self.config.max_active)
            .field("initialized", &self.is_initialized())
            .field("closed", &self.is_closed())
            .finish()
    }
}
