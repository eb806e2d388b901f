//! Nutanix Common Library
//!
//! Shared error type, Prism v3 API models and provider configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use types::*;

/// Provider version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
