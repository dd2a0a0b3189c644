//! Shared fixtures for gateway integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fatigue_core::error::{FatigueError, Result};
use fatigue_core::Point;
use fatigue_gateway::app_state::AppState;
use fatigue_gateway::config::{self, FileConfig, GatewayConfig};
use fatigue_gateway::sink::PointWriter;

pub fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k: &str| map.get(k).cloned()
}

pub fn test_config() -> GatewayConfig {
    config::resolve(
        FileConfig::default(),
        env(&[
            ("INFLUX_URL", "http://127.0.0.1:8086"),
            ("INFLUX_TOKEN", "test-token"),
            ("INFLUX_ORG", "test-org"),
        ]),
    )
    .expect("test config must resolve")
}

/// Keeps every enqueued point in memory.
#[derive(Default)]
pub struct RecordingWriter {
    pub points: Mutex<Vec<Point>>,
    pub flushes: AtomicUsize,
    pub closes: AtomicUsize,
}

impl RecordingWriter {
    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }
}

#[async_trait]
impl PointWriter for RecordingWriter {
    fn write(&self, point: &Point) -> Result<()> {
        self.points.lock().unwrap().push(point.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Behaves like a write buffer whose backend is gone.
#[derive(Default)]
pub struct FailingWriter {
    pub attempts: AtomicUsize,
    pub closes: AtomicUsize,
}

#[async_trait]
impl PointWriter for FailingWriter {
    fn write(&self, _point: &Point) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(FatigueError::StorageWrite("connection refused".into()))
    }

    async fn flush(&self) -> Result<()> {
        Err(FatigueError::StorageWrite("connection refused".into()))
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Err(FatigueError::StorageWrite("connection refused".into()))
    }
}

pub fn state_with(writer: Arc<dyn PointWriter>) -> AppState {
    AppState::new(test_config(), "test-host".into(), writer)
}
