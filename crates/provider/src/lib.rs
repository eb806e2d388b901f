//! Nutanix Terraform Provider
//!
//! Implements the `nutanix_category_key` resource on top of the Prism
//! Central v3 API.

pub mod client;
pub mod diagnostics;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

pub use client::{NutanixApi, NutanixClient};
pub use diagnostics::{Diagnostic, Severity};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockNutanixClient;
pub use provider::NutanixProvider;
pub use state::{DynamicValue, ResourceData};
