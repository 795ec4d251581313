//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod fs;
pub mod github;
pub mod telemetry;
