//! Shared utilities for AEGIS hosts and tools.

pub mod logging;

pub use logging::{init_tracing, init_tracing_json};
