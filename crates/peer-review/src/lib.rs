pub mod config;
pub mod error;
pub mod reviews;
pub mod telemetry;
