//! Nutanix CLI - Main Entry Point
//!
//! Manages a single `nutanix_category_key` against Prism Central, the way
//! Terraform would drive the provider.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::debug;

use nutanix_cli::commands::category_key::{self, CategoryKeyCommands};
use nutanix_cli::output::{self, print_diagnostics};
use nutanix_cli::state_file::StateFile;
use nutanix_common::config::{DEFAULT_PORT, DEFAULT_WAIT_TIMEOUT};
use nutanix_provider::diagnostics::has_errors;
use nutanix_provider::state::{bool_value, int_value, make_state, string_value, DynamicValue};
use nutanix_provider::NutanixProvider;

/// Nutanix CLI - category keys on Prism Central
#[derive(Parser)]
#[command(name = "nutanix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Prism Central host name or address
    #[arg(long, env = "NUTANIX_ENDPOINT", global = true, default_value = "")]
    endpoint: String,

    /// Prism Central port
    #[arg(long, env = "NUTANIX_PORT", global = true, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, env = "NUTANIX_USERNAME", global = true, default_value = "")]
    username: String,

    #[arg(long, env = "NUTANIX_PASSWORD", global = true, default_value = "", hide_env_values = true)]
    password: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "NUTANIX_INSECURE", global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_WAIT_TIMEOUT)]
    wait_timeout: u64,

    /// State file (`.msgpack` for msgpack encoding)
    #[arg(long, global = true, default_value = "terraform.tfstate.json")]
    state: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    CategoryKey(CategoryKeyCommands),

    /// Show version information
    Version,
}

impl Cli {
    /// Provider block assembled from the connection flags
    fn provider_config(&self) -> DynamicValue {
        make_state(vec![
            ("endpoint", string_value(&self.endpoint)),
            ("port", int_value(i64::from(self.port))),
            ("username", string_value(&self.username)),
            ("password", string_value(&self.password)),
            ("insecure", bool_value(self.insecure)),
            ("wait_timeout", int_value(i64::try_from(self.wait_timeout).unwrap_or(i64::MAX))),
        ])
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let provider_config = cli.provider_config();
    let state_file = StateFile::new(&cli.state, category_key::TYPE_NAME);

    match cli.command {
        Commands::CategoryKey(cmd) => {
            let provider = NutanixProvider::new();
            if cmd.needs_provider() {
                let diagnostics = provider.configure_provider(&provider_config).await;
                print_diagnostics(&diagnostics);
                if has_errors(&diagnostics) {
                    bail!("provider configuration failed");
                }
                debug!("Configured for {}", provider.config().await.base_url());
            }

            category_key::execute(cmd, &provider, &state_file, cli.format).await?;
        }
        Commands::Version => {
            println!("nutanix CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Provider library v{}", nutanix_common::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutanix_provider::state::get_int_attr;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "nutanix",
            "--endpoint",
            "pc.local",
            "apply",
            "--name",
            "k1",
            "--description",
            "team",
        ])
        .unwrap();

        assert_eq!(cli.endpoint, "pc.local");
        match cli.command {
            Commands::CategoryKey(CategoryKeyCommands::Apply { name, description, api_version }) => {
                assert_eq!(name, "k1");
                assert_eq!(description.as_deref(), Some("team"));
                assert!(api_version.is_none());
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_apply_requires_name() {
        assert!(Cli::try_parse_from(["nutanix", "apply"]).is_err());
    }

    #[test]
    fn test_provider_config_value() {
        let cli = Cli::try_parse_from(["nutanix", "--port", "9441", "--insecure", "show"]).unwrap();
        let config = cli.provider_config();
        assert_eq!(get_int_attr(&config, "port", 0), 9441);
        assert_eq!(config.get("insecure"), Some(&bool_value(true)));
    }

    #[test]
    fn test_huge_wait_timeout_saturates() {
        let cli = Cli::try_parse_from(["nutanix", "--wait-timeout", "18446744073709551615", "show"])
            .unwrap();
        assert_eq!(get_int_attr(&cli.provider_config(), "wait_timeout", 0), i64::MAX);
    }
}
