//! Public HTTP API.

pub mod error;
pub mod submit;

pub use error::ApiError;
pub use submit::submit;
