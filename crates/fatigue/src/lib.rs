//! Top-level facade crate for the fatigue gateway.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use fatigue_core::*;
}

pub mod gateway {
    pub use fatigue_gateway::*;
}
