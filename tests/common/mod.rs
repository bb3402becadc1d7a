//! Shared test utilities for dbfactory integration tests.
//!
//! Provides fake connectors with observable side effects and a helper that
//! builds a factory with all of them registered.

#![allow(dead_code)]

use async_trait::async_trait;
use dbfactory::factory::{BackendHandle, DbFactory};
use dbfactory::registry::{BackendRegistry, Connector, ConnectorError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Tags
// =============================================================================

pub const ECHO: &str = "echo";
pub const COUNTING: &str = "counting";
pub const FAILING: &str = "failing";
pub const STUCK: &str = "stuck";
pub const SLOW: &str = "slow";

/// How long [`SlowConnector`] takes to connect.
pub const SLOW_CONNECT: Duration = Duration::from_millis(30);

// =============================================================================
// Echo: the instance is the config value itself
// =============================================================================

pub struct EchoConnector;

#[async_trait]
impl Connector for EchoConnector {
    type Config = i64;
    type Handle = i64;

    fn describe(&self) -> &'static str {
        "returns its config as the instance"
    }

    async fn connect(&self, config: &i64) -> Result<i64, ConnectorError> {
        Ok(*config)
    }

    async fn close(&self, _handle: &i64) -> Result<(), ConnectorError> {
        Ok(())
    }
}

// =============================================================================
// Counting: records connects and closes, in order
// =============================================================================

#[derive(Clone, Default)]
pub struct Calls {
    connects: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Events such as `"connect a"` and `"close a"`, oldest first.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counted {
    pub label: String,
}

impl BackendHandle for Counted {
    const BACKEND_TYPES: &'static [&'static str] = &[COUNTING, STUCK];
}

pub struct CountingConnector {
    pub calls: Calls,
}

#[async_trait]
impl Connector for CountingConnector {
    type Config = String;
    type Handle = Counted;

    fn describe(&self) -> &'static str {
        "counts connects and closes"
    }

    async fn connect(&self, label: &String) -> Result<Counted, ConnectorError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("connect {}", label));
        Ok(Counted {
            label: label.clone(),
        })
    }

    async fn close(&self, handle: &Counted) -> Result<(), ConnectorError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("close {}", handle.label));
        Ok(())
    }
}

// =============================================================================
// Failing: connect always errors
// =============================================================================

pub struct FailingConnector {
    pub calls: Calls,
}

#[async_trait]
impl Connector for FailingConnector {
    type Config = String;
    type Handle = Counted;

    fn describe(&self) -> &'static str {
        "never connects"
    }

    async fn connect(&self, label: &String) -> Result<Counted, ConnectorError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("connect {}", label));
        Err(ConnectorError::Connect(format!("{} is unreachable", label)))
    }

    async fn close(&self, _handle: &Counted) -> Result<(), ConnectorError> {
        Ok(())
    }
}

// =============================================================================
// Stuck: connects fine, close always errors
// =============================================================================

pub struct StuckConnector {
    pub calls: Calls,
}

#[async_trait]
impl Connector for StuckConnector {
    type Config = String;
    type Handle = Counted;

    fn describe(&self) -> &'static str {
        "never closes cleanly"
    }

    async fn connect(&self, label: &String) -> Result<Counted, ConnectorError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("connect {}", label));
        Ok(Counted {
            label: label.clone(),
        })
    }

    async fn close(&self, handle: &Counted) -> Result<(), ConnectorError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("close {}", handle.label));
        Err(ConnectorError::Close(format!("{} did not close", handle.label)))
    }
}

// =============================================================================
// Slow: connect sleeps, so a sweep spans many scheduler ticks
// =============================================================================

pub struct SlowConnector {
    pub calls: Calls,
}

#[async_trait]
impl Connector for SlowConnector {
    type Config = String;
    type Handle = Counted;

    fn describe(&self) -> &'static str {
        "sleeps before connecting"
    }

    async fn connect(&self, label: &String) -> Result<Counted, ConnectorError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("connect {}", label));
        tokio::time::sleep(SLOW_CONNECT).await;
        Ok(Counted {
            label: label.clone(),
        })
    }

    async fn close(&self, handle: &Counted) -> Result<(), ConnectorError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        self.calls.record(format!("close {}", handle.label));
        Ok(())
    }
}

// =============================================================================
// Factory builders
// =============================================================================

/// A factory with no built-ins and every fake connector registered.
///
/// All fakes share one [`Calls`], so the log shows the global order.
pub fn fake_factory() -> (DbFactory, Calls) {
    let calls = Calls::default();
    let factory = DbFactory::with_registry(Arc::new(BackendRegistry::new()));

    factory.register_connector(ECHO, EchoConnector);
    factory.register_connector(
        COUNTING,
        CountingConnector {
            calls: calls.clone(),
        },
    );
    factory.register_connector(
        FAILING,
        FailingConnector {
            calls: calls.clone(),
        },
    );
    factory.register_connector(
        STUCK,
        StuckConnector {
            calls: calls.clone(),
        },
    );
    factory.register_connector(
        SLOW,
        SlowConnector {
            calls: calls.clone(),
        },
    );

    (factory, calls)
}

/// Boxed config for the string-configured fakes.
pub fn label(label: &str) -> dbfactory::registry::ConfigValue {
    Box::new(label.to_string())
}
