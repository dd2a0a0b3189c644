//! Fatigue gateway library entry.
//!
//! This crate wires config, the write buffer, and the HTTP surface into one
//! service. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod host;
pub mod ops;
pub mod router;
pub mod shutdown;
pub mod sink;
