//! Shared application state for the fatigue gateway.
//!
//! The write buffer handle is created once in `main` and injected here; every
//! request task reaches it through `AppState`, never through a global.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::sink::PointWriter;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    writer: Arc<dyn PointWriter>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    host: String,
}

impl AppState {
    pub fn new(cfg: GatewayConfig, host: String, writer: Arc<dyn PointWriter>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, host }),
            writer,
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    /// Hostname tagged on every point.
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    pub fn writer(&self) -> &dyn PointWriter {
        self.writer.as_ref()
    }
}
