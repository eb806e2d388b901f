//! Nutanix CLI
//!
//! Drives the `nutanix_category_key` resource from the command line,
//! keeping its state in a local file.

pub mod commands;
pub mod output;
pub mod state_file;
