//! Shared utilities for the pontoon workspace.

pub mod bytes;
pub mod logging;

pub use bytes::concat_bytes;
pub use logging::{init_logging, LogFormat};
