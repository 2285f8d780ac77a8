pub mod blob;
pub mod config;
pub mod telemetry;
