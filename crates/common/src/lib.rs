//! Shared building blocks for the service binaries: response types and
//! logging setup.

pub mod types;
pub mod utils;
