//! Streamvault infrastructure
//!
//! Process-level concerns shared by whatever embeds the ingestion pipeline.

pub mod telemetry;

pub use telemetry::init_telemetry;
