//! Write buffer: the seam between request handlers and the time-series backend.
//!
//! Handlers only see [`PointWriter`]. `write` is a non-blocking enqueue; batching,
//! delivery and retry happen behind it and are invisible to the submitter.

pub mod buffer;
pub mod influx;

use async_trait::async_trait;

use fatigue_core::error::Result;
use fatigue_core::Point;

pub use influx::InfluxWriter;

#[async_trait]
pub trait PointWriter: Send + Sync {
    /// Enqueue one point. Must not wait on backend I/O.
    fn write(&self, point: &Point) -> Result<()>;

    /// Deliver everything enqueued so far.
    async fn flush(&self) -> Result<()>;

    /// Final flush, then release the backend connection. Later writes fail.
    async fn close(&self) -> Result<()>;
}
