//! Cloud Spanner adapter for the load driver, speaking the service's REST API.
mod api;
mod wire;

mod config;
pub use config::{DEFAULT_ENDPOINT, PoolConfig, SpannerConfig};

mod errors;
pub use errors::SpannerError;

mod pool;

mod client;
pub use client::SpannerClient;

#[cfg(test)]
mod testing;
