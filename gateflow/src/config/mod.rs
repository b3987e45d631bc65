//! Gateway configuration, re-read on every use.

mod settings;

pub use settings::{DynamicConfig, GatewaySettings};
