//! Fatigue core: submission validation, time-series points, and the error
//! surface shared by the gateway and its tests.
//!
//! This crate carries no transport or runtime dependencies. It turns a JSON
//! body into a validated [`Submission`], and a submission into a [`Point`]
//! encoded as InfluxDB line protocol.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed client input must surface as `FatigueError::Validation`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod point;
pub mod submission;

/// Shared result type.
pub use error::{Result, FatigueError};
pub use point::{FieldValue, Point};
pub use submission::Submission;
