//! Tests for the reservoir pool configuration and statistics

use reservoir::prelude::*;
use std::time::Duration;

// ==================== PoolConfig Tests ====================

#[test]
fn test_pool_config_default() {
    let config = PoolConfig::default();

    assert_eq!(config.initial_size, 1);
    assert_eq!(config.max_active, 8);
    assert_eq!(config.min_idle, 0);
    assert_eq!(config.max_wait, None);
    assert_eq!(config.min_evictable_idle, Duration::from_secs(1800));
    assert_eq!(config.max_evictable_idle, Duration::from_secs(25200));
    assert_eq!(config.keep_alive_between, Duration::from_secs(120));
    assert_eq!(config.time_between_eviction_runs, Duration::from_secs(60));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert!(!config.test_on_borrow);
    assert!(!config.test_on_return);
    assert!(config.test_while_idle);
    assert!(!config.keep_alive);
    assert!(!config.check_execute_time);
}

#[test]
fn test_pool_config_new() {
    let config = PoolConfig::new("mysql://localhost/test");

    assert_eq!(config.url, "mysql://localhost/test");
    assert_eq!(config.initial_size, 1);
    assert_eq!(config.max_active, 8);
}

#[test]
fn test_pool_config_builder() {
    let config = PoolConfig::new("mysql://localhost/test")
        .with_initial_size(4)
        .with_min_idle(2)
        .with_max_active(20)
        .with_max_wait(Some(Duration::from_secs(5)))
        .with_min_evictable_idle(Duration::from_secs(300))
        .with_max_evictable_idle(Duration::from_secs(3600))
        .with_keep_alive_between(Duration::from_secs(90))
        .with_time_between_eviction_runs(Duration::from_secs(30))
        .with_test_on_borrow(true)
        .with_test_on_return(true)
        .with_test_while_idle(false)
        .with_keep_alive(true)
        .with_check_execute_time(true)
        .with_validation_query("SELECT 1 FROM DUAL")
        .with_validation_query_timeout(Duration::from_secs(3))
        .with_username("app")
        .with_password("secret")
        .with_connect_timeout(Duration::from_secs(20))
        .with_property("useSSL", "false");

    assert_eq!(config.initial_size, 4);
    assert_eq!(config.min_idle, 2);
    assert_eq!(config.max_active, 20);
    assert_eq!(config.max_wait, Some(Duration::from_secs(5)));
    assert_eq!(config.min_evictable_idle, Duration::from_secs(300));
    assert_eq!(config.max_evictable_idle, Duration::from_secs(3600));
    assert_eq!(config.keep_alive_between, Duration::from_secs(90));
    assert_eq!(config.time_between_eviction_runs, Duration::from_secs(30));
    assert!(config.test_on_borrow);
    assert!(config.test_on_return);
    assert!(!config.test_while_idle);
    assert!(config.keep_alive);
    assert!(config.check_execute_time);
    assert_eq!(config.validation_query.as_deref(), Some("SELECT 1 FROM DUAL"));
    assert_eq!(config.validation_query_timeout, Some(Duration::from_secs(3)));
    assert_eq!(config.username.as_deref(), Some("app"));
    assert_eq!(config.password.as_deref(), Some("secret"));
    assert_eq!(config.connect_timeout, Duration::from_secs(20));
    assert_eq!(config.properties.get("useSSL").map(String::as_str), Some("false"));
}

// ==================== Validation Tests ====================

#[test]
fn test_pool_config_validate_defaults() {
    assert!(PoolConfig::new("mysql://localhost/test").validate().is_ok());
}

#[test]
fn test_pool_config_rejects_zero_capacity() {
    let config = PoolConfig::new("mysql://localhost/test").with_max_active(0);
    let err = config.validate().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_pool_config_rejects_floor_above_capacity() {
    let config = PoolConfig::new("mysql://localhost/test")
        .with_max_active(2)
        .with_min_idle(3);
    assert!(config.validate().is_err());

    // The floor may equal the capacity.
    let config = PoolConfig::new("mysql://localhost/test")
        .with_max_active(3)
        .with_min_idle(3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_pool_config_rejects_oversized_initial_fill() {
    let config = PoolConfig::new("mysql://localhost/test")
        .with_max_active(2)
        .with_initial_size(3);
    assert!(config.validate().is_err());
}

#[test]
fn test_pool_config_rejects_inverted_eviction_window() {
    let config = PoolConfig::new("mysql://localhost/test")
        .with_min_evictable_idle(Duration::from_secs(600))
        .with_max_evictable_idle(Duration::from_secs(300));
    assert!(config.validate().is_err());
}

#[test]
fn test_pool_config_keep_alive_spacing() {
    // Keep-alive refreshes must be spaced wider than the sweep period,
    // otherwise every sweep would re-probe every idle connection.
    let config = PoolConfig::new("mysql://localhost/test")
        .with_keep_alive(true)
        .with_keep_alive_between(Duration::from_secs(60))
        .with_time_between_eviction_runs(Duration::from_secs(60));
    assert!(config.validate().is_err());

    let config = config.with_keep_alive_between(Duration::from_secs(61));
    assert!(config.validate().is_ok());
}

// ==================== Derived Settings Tests ====================

#[test]
fn test_idle_check_threshold_falls_back() {
    let config =
        PoolConfig::new("mysql://localhost/test").with_time_between_eviction_runs(Duration::ZERO);
    assert_eq!(config.idle_check_threshold(), Duration::from_secs(60));
    assert_eq!(config.evictor_period(), Duration::from_millis(1000));
}

#[test]
fn test_initial_fill_target_tracks_keep_alive() {
    let config = PoolConfig::new("mysql://localhost/test")
        .with_initial_size(5)
        .with_min_idle(2);
    assert_eq!(config.initial_fill_target(), 5);

    let config = config.with_keep_alive(true);
    assert_eq!(config.initial_fill_target(), 2);
}

#[test]
fn test_connect_settings_carry_credentials() {
    let config = PoolConfig::new("mysql://db:3306/orders")
        .with_username("app")
        .with_password("secret")
        .with_connect_timeout(Duration::from_secs(7))
        .with_property("charset", "utf8mb4");
    let settings = config.connect_settings();

    assert_eq!(settings.url, "mysql://db:3306/orders");
    assert_eq!(settings.username.as_deref(), Some("app"));
    assert_eq!(settings.password.as_deref(), Some("secret"));
    assert_eq!(settings.connect_timeout, Duration::from_secs(7));
    assert_eq!(settings.properties.get("charset").map(String::as_str), Some("utf8mb4"));
}

// ==================== PoolStats Tests ====================

#[test]
fn test_pool_stats_default() {
    let stats = PoolStats::default();

    assert_eq!(stats.connections_created, 0);
    assert_eq!(stats.connections_closed, 0);
    assert_eq!(stats.connections_evicted, 0);
    assert_eq!(stats.keep_alive_refreshed, 0);
    assert_eq!(stats.borrows, 0);
    assert_eq!(stats.borrow_timeouts, 0);
    assert_eq!(stats.discards, 0);
    assert_eq!(stats.total_wait_time_ms, 0);
    assert_eq!(stats.idle, 0);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.waiting, 0);
}

#[test]
fn test_pool_stats_avg_wait_time() {
    let mut stats = PoolStats::default();
    assert_eq!(stats.avg_wait_time_ms(), 0.0);

    stats.borrows = 4;
    stats.total_wait_time_ms = 100;
    assert!((stats.avg_wait_time_ms() - 25.0).abs() < 0.01);
}

#[test]
fn test_pool_stats_serde() {
    let stats = PoolStats {
        connections_created: 10,
        borrows: 42,
        idle: 3,
        ..Default::default()
    };
    let json = serde_json::to_string(&stats).unwrap();
    let back: PoolStats = serde_json::from_str(&json).unwrap();
    assert_eq!(back.connections_created, 10);
    assert_eq!(back.borrows, 42);
    assert_eq!(back.idle, 3);
}
