//! # reservoir
//!
//! Bounded, validating database connection pool with demand-driven creation
//! and background eviction.
//!
//! The pool owns a fixed number of physical connections, lends them out
//! through RAII handles, and continuously grooms the idle store so borrowers
//! never receive a dead connection without a fight.
//!
//! ## Features
//!
//! - **Bounded Capacity**: idle plus borrowed never exceeds `max_active`
//! - **LIFO Reuse**: the most recently returned connection is borrowed first
//! - **Validation Hooks**: borrow-time, return-time, and idle-age checks via
//!   pluggable vendor checkers
//! - **Demand-Driven Creation**: a background task dials replacements only
//!   when a borrower is actually waiting or the idle floor is breached
//! - **Eviction and Keep-Alive**: a periodic sweep retires old connections
//!   and refreshes the ones worth keeping
//! - **Driver Agnostic**: bring any driver by implementing two traits
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reservoir::prelude::*;
//!
//! // Configure the pool
//! let config = PoolConfig::new("mysql://app:secret@db:3306/orders")
//!     .with_initial_size(2)
//!     .with_max_active(16)
//!     .with_min_idle(4)
//!     .with_test_while_idle(true);
//!
//! // MyFactory implements ConnectionFactory for your driver
//! let pool = ConnectionPool::new(config, Arc::new(MyFactory));
//! pool.initialize().await?;
//!
//! // Borrow, use, return
//! let mut conn = pool.get().await?;
//! let rows = conn.query("SELECT id FROM users", None).await?;
//! conn.close().await?;
//!
//! pool.close().await;
//! ```
//!
//! Dropping a [`PooledConnection`](handle::PooledConnection) without calling
//! `close` still returns the connection; an explicit `close` is preferred
//! because it runs the return-time checks on the caller's task.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod checker;
pub mod config;
pub mod connection;
pub mod error;
pub mod handle;
pub mod holder;
pub mod pool;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and row types
    pub use crate::types::{Row, Value};

    // Connection traits and settings
    pub use crate::connection::{ConnectSettings, Connection, ConnectionFactory, Vendor};

    // Validity checking
    pub use crate::checker::{CheckerRegistry, QueryChecker, ValidityChecker};

    // Pool types
    pub use crate::config::{PoolConfig, PoolStats};
    pub use crate::handle::PooledConnection;
    pub use crate::pool::ConnectionPool;
}

// Re-export commonly used items at crate root
pub use config::PoolConfig;
pub use error::{Error, Result};
pub use pool::ConnectionPool;
