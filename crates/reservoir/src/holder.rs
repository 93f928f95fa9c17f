//! Connection holder bookkeeping
//!
//! A [`ConnectionHolder`] wraps one physical connection for its whole pool
//! lifetime and carries the timestamps the borrow-time and eviction-time
//! policies read. Timestamps are milliseconds relative to the pool's epoch
//! instant, stored in atomics so handles can stamp them without the pool lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::connection::Connection;

/// Bookkeeping wrapper around one pooled physical connection
pub struct ConnectionHolder {
    conn: Arc<dyn Connection>,
    epoch: Instant,
    connect_at_millis: u64,
    last_active_millis: AtomicU64,
    last_exec_millis: AtomicU64,
    last_keep_millis: AtomicU64,
    last_valid_millis: AtomicU64,
    // Mutated only under the pool lock.
    active: AtomicBool,
}

impl ConnectionHolder {
    /// Wrap a freshly dialed connection
    ///
    /// `epoch` is the pool's reference instant; all timestamps are offsets
    /// from it.
    pub fn new(conn: Arc<dyn Connection>, epoch: Instant) -> Self {
        let now = epoch.elapsed().as_millis() as u64;
        Self {
            conn,
            epoch,
            connect_at_millis: now,
            last_active_millis: AtomicU64::new(now),
            last_exec_millis: AtomicU64::new(0),
            last_keep_millis: AtomicU64::new(0),
            last_valid_millis: AtomicU64::new(0),
            active: AtomicBool::new(false),
        }
    }

    /// The wrapped physical connection
    #[inline]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.conn
    }

    /// Current time in epoch-relative milliseconds
    #[inline]
    pub fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// When this connection was dialed, in epoch-relative milliseconds
    #[inline]
    pub fn connect_at_millis(&self) -> u64 {
        self.connect_at_millis
    }

    /// Last borrow or return time
    #[inline]
    pub fn last_active_millis(&self) -> u64 {
        self.last_active_millis.load(Ordering::Relaxed)
    }

    /// Stamp the last-active time to now
    pub fn touch_active(&self) {
        self.last_active_millis
            .store(self.now_millis(), Ordering::Relaxed);
    }

    /// Last statement execution time
    #[inline]
    pub fn last_exec_millis(&self) -> u64 {
        self.last_exec_millis.load(Ordering::Relaxed)
    }

    /// Stamp the last-execution time to now
    pub fn touch_exec(&self) {
        self.last_exec_millis
            .store(self.now_millis(), Ordering::Relaxed);
    }

    /// Last keep-alive refresh time
    #[inline]
    pub fn last_keep_millis(&self) -> u64 {
        self.last_keep_millis.load(Ordering::Relaxed)
    }

    /// Stamp the keep-alive time to now
    pub fn touch_keep(&self) {
        self.last_keep_millis
            .store(self.now_millis(), Ordering::Relaxed);
    }

    /// Last successful validation time
    #[inline]
    pub fn last_valid_millis(&self) -> u64 {
        self.last_valid_millis.load(Ordering::Relaxed)
    }

    /// Stamp the last-validation time to now
    pub fn touch_valid(&self) {
        self.last_valid_millis
            .store(self.now_millis(), Ordering::Relaxed);
    }

    /// Whether the holder is counted against the active total
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark or clear the active flag; callers hold the pool lock
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Idle time in milliseconds against the plain last-active stamp
    #[inline]
    pub fn idle_millis(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_active_millis())
    }

    /// Last-use time for the borrow-time idle computation
    ///
    /// The execution stamp replaces the active stamp when
    /// `check_execute_time` is on and the two differ; a newer keep-alive
    /// stamp wins over either.
    pub fn effective_last_active_millis(&self, check_execute_time: bool) -> u64 {
        let mut last = self.last_active_millis();
        let exec = self.last_exec_millis();
        if check_execute_time && exec != last {
            last = exec;
        }
        let keep = self.last_keep_millis();
        if keep > last {
            last = keep;
        }
        last
    }
}

impl std::fmt::Debug for ConnectionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHolder")
            .field("connect_at_millis", &self.connect_at_millis)
            .field("last_active_millis", &self.last_active_millis())
            .field("last_exec_millis", &self.last_exec_millis())
            .field("last_keep_millis", &self.last_keep_millis())
            .field("last_valid_millis", &self.last_valid_millis())
            .field("active", &self.is_active())
            .finish()
    }
}
