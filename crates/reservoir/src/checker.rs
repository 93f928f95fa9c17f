//! Connection validity checking
//!
//! A [`ValidityChecker`] decides whether a pooled connection is still usable.
//! Checkers are registered per vendor in a [`CheckerRegistry`]; the pool looks
//! one up at startup from the configured vendor (or URL scheme) and falls back
//! to running the plain validation query when no checker is registered.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::connection::{Connection, Vendor};
use crate::error::Result;

/// Probe for connection liveness
#[async_trait]
pub trait ValidityChecker: Send + Sync {
    /// Check whether the connection is usable
    ///
    /// `validation_query` overrides the checker's built-in probe when set.
    /// Driver errors may be returned as `Err`; the pool treats any error as
    /// "not valid" and never surfaces it to borrowers.
    async fn is_valid(
        &self,
        conn: &dyn Connection,
        validation_query: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<bool>;
}

/// Default probe query used when neither the configuration nor the checker
/// supplies one
pub const DEFAULT_VALIDATION_QUERY: &str = "SELECT 1";

/// Checker that runs a lightweight query and requires at least one row back
#[derive(Debug, Clone)]
pub struct QueryChecker {
    default_query: String,
}

impl QueryChecker {
    /// Create a checker with the standard `SELECT 1` probe
    pub fn new() -> Self {
        Self {
            default_query: DEFAULT_VALIDATION_QUERY.to_string(),
        }
    }

    /// Create a checker with a custom default probe query
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            default_query: query.into(),
        }
    }
}

impl Default for QueryChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValidityChecker for QueryChecker {
    async fn is_valid(
        &self,
        conn: &dyn Connection,
        validation_query: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        if conn.is_closed() {
            return Ok(false);
        }
        let query = validation_query.unwrap_or(&self.default_query);
        let rows = conn.query(query, timeout).await?;
        Ok(!rows.is_empty())
    }
}

/// Registry of validity checkers keyed by vendor
#[derive(Clone, Default)]
pub struct CheckerRegistry {
    checkers: HashMap<Vendor, Arc<dyn ValidityChecker>>,
}

impl CheckerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in checkers for the vendors that
    /// support a cheap `SELECT 1` probe
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let query_checker: Arc<dyn ValidityChecker> = Arc::new(QueryChecker::new());
        registry.checkers.insert(Vendor::MySql, query_checker.clone());
        registry.checkers.insert(Vendor::Postgres, query_checker);
        registry
    }

    /// Register a checker for a vendor, replacing any existing one
    pub fn register(&mut self, vendor: Vendor, checker: Arc<dyn ValidityChecker>) {
        self.checkers.insert(vendor, checker);
    }

    /// Look up the checker for a vendor
    pub fn get(&self, vendor: Vendor) -> Option<Arc<dyn ValidityChecker>> {
        self.checkers.get(&vendor).cloned()
    }

    /// Number of registered checkers
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

impl std::fmt::Debug for CheckerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerRegistry")
            .field("vendors", &self.checkers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Row, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct ProbeConn {
        closed: AtomicBool,
        fail_queries: bool,
        return_rows: bool,
    }

    impl ProbeConn {
        fn alive() -> Self {
            Self {
                closed: AtomicBool::new(false),
                fail_queries: false,
                return_rows: true,
            }
        }
    }

    #[async_trait]
    impl Connection for ProbeConn {
        async fn query(&self, _sql: &str, _timeout: Option<Duration>) -> Result<Vec<Row>> {
            if self.fail_queries {
                return Err(Error::driver("probe failed"));
            }
            if self.return_rows {
                Ok(vec![Row::new(vec!["1".into()], vec![Value::Int(1)])])
            } else {
                Ok(vec![])
            }
        }

        async fn execute(&self, _sql: &str) -> Result<u64> {
            Ok(0)
        }

        async fn set_auto_commit(&self, _auto_commit: bool) -> Result<()> {
            Ok(())
        }

        async fn commit(&self) -> Result<()> {
            Ok(())
        }

        async fn rollback(&self) -> Result<()> {
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_query_checker_valid_connection() {
        let conn = ProbeConn::alive();
        let checker = QueryChecker::new();
        assert!(checker.is_valid(&conn, None, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_checker_closed_connection() {
        let conn = ProbeConn::alive();
        conn.close().await.unwrap();
        let checker = QueryChecker::new();
        assert!(!checker.is_valid(&conn, None, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_checker_no_rows_is_invalid() {
        let conn = ProbeConn {
            return_rows: false,
            ..ProbeConn::alive()
        };
        let checker = QueryChecker::new();
        assert!(!checker.is_valid(&conn, None, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_checker_propagates_driver_error() {
        let conn = ProbeConn {
            fail_queries: true,
            ..ProbeConn::alive()
        };
        let checker = QueryChecker::new();
        assert!(checker.is_valid(&conn, None, None).await.is_err());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = CheckerRegistry::with_defaults();
        assert!(registry.get(Vendor::MySql).is_some());
        assert!(registry.get(Vendor::Postgres).is_some());
        assert!(registry.get(Vendor::Sqlite).is_none());
        assert!(registry.get(Vendor::Unknown).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_register_override() {
        let mut registry = CheckerRegistry::new();
        assert!(registry.is_empty());
        registry.register(Vendor::Sqlite, Arc::new(QueryChecker::with_query("SELECT 1")));
        assert!(registry.get(Vendor::Sqlite).is_some());
    }
}
