//! Borrowed connection handle
//!
//! A [`PooledConnection`] forwards database operations to the underlying
//! connection and hands it back to the pool on [`close`](PooledConnection::close)
//! or drop. The first close wins; closing again is a no-op.

use std::sync::Arc;
use std::time::Duration;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::holder::ConnectionHolder;
use crate::pool::ConnectionPool;
use crate::types::Row;

/// A connection borrowed from the pool
pub struct PooledConnection {
    pool: Arc<ConnectionPool>,
    holder: Option<Arc<ConnectionHolder>>,
    conn: Option<Arc<dyn Connection>>,
}

impl PooledConnection {
    pub(crate) fn new(pool: Arc<ConnectionPool>, holder: Arc<ConnectionHolder>) -> Self {
        let conn = Arc::clone(holder.connection());
        Self {
            pool,
            holder: Some(holder),
            conn: Some(conn),
        }
    }

    fn conn(&self) -> Result<&Arc<dyn Connection>> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::closed("connection handle already recycled"))
    }

    /// Execute a query that returns rows
    pub async fn query(&self, sql: &str, timeout: Option<Duration>) -> Result<Vec<Row>> {
        self.conn()?.query(sql, timeout).await
    }

    /// Execute a statement that modifies data, returns affected row count
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        self.conn()?.execute(sql).await
    }

    /// Set auto-commit mode
    ///
    /// Toggling the transaction boundary counts as execution for the
    /// idle-time computation.
    pub async fn set_auto_commit(&self, auto_commit: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.set_auto_commit(auto_commit).await?;
        if let Some(holder) = &self.holder {
            holder.touch_exec();
        }
        Ok(())
    }

    /// Commit the current transaction
    pub async fn commit(&self) -> Result<()> {
        self.conn()?.commit().await
    }

    /// Roll back the current transaction
    pub async fn rollback(&self) -> Result<()> {
        self.conn()?.rollback().await
    }

    /// Whether this handle can no longer serve operations
    ///
    /// True once recycled, or when the underlying connection died.
    pub fn is_closed(&self) -> bool {
        match &self.conn {
            Some(conn) => conn.is_closed(),
            None => true,
        }
    }

    /// Return the connection to the pool
    ///
    /// The underlying connection is re-pooled or discarded per the return
    /// policy. Calling this on an already-recycled handle is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        let Some(holder) = self.holder.take() else {
            return Ok(());
        };
        self.conn = None;
        self.pool.recycle(holder).await;
        Ok(())
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("recycled", &self.holder.is_none())
            .field("holder", &self.holder)
            .finish()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(holder) = self.holder.take() {
            self.conn = None;
            let pool = Arc::clone(&self.pool);
            tokio::spawn(async move {
                pool.recycle(holder).await;
            });
        }
    }
}
