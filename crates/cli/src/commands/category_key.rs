//! Category Key Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

use nutanix_provider::provider::StateResponse;
use nutanix_provider::schema::{category_key_schema, Attribute};
use nutanix_provider::state::{get_bool_attr, get_string_attr, make_state, string_value, DynamicValue};
use nutanix_provider::{Diagnostic, NutanixProvider};

use crate::output::{
    print_diagnostics, print_info, print_item, print_list, print_success, print_warning,
    OutputFormat, TableDisplay,
};
use crate::state_file::StateFile;

pub const TYPE_NAME: &str = "nutanix_category_key";

#[derive(Subcommand)]
pub enum CategoryKeyCommands {
    /// Create or update the category key
    Apply {
        /// Category key name
        #[arg(short, long)]
        name: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// API version to request
        #[arg(long)]
        api_version: Option<String>,
    },

    /// Re-read the category key into state
    Refresh,

    /// Delete the category key
    Destroy,

    /// Adopt an existing category key
    Import {
        /// Category key name
        name: String,
    },

    /// Show the stored state
    Show,

    /// Show the resource schema
    Schema,
}

impl CategoryKeyCommands {
    /// Whether the command talks to Prism Central
    pub fn needs_provider(&self) -> bool {
        !matches!(self, CategoryKeyCommands::Show | CategoryKeyCommands::Schema)
    }
}

/// Category key display wrapper for serialization
#[derive(Serialize)]
pub struct CategoryKeyDisplay {
    pub id: String,
    pub name: String,
    pub description: String,
    pub api_version: String,
    pub system_defined: bool,
}

impl From<&DynamicValue> for CategoryKeyDisplay {
    fn from(state: &DynamicValue) -> Self {
        Self {
            id: get_string_attr(state, "id"),
            name: get_string_attr(state, "name"),
            description: get_string_attr(state, "description"),
            api_version: get_string_attr(state, "api_version"),
            system_defined: get_bool_attr(state, "system_defined", false),
        }
    }
}

impl TableDisplay for CategoryKeyDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "API Version", "System Defined"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.api_version.clone(),
            self.system_defined.to_string(),
        ]
    }
}

#[derive(Serialize)]
pub struct AttributeDisplay {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
}

impl From<&Attribute> for AttributeDisplay {
    fn from(attr: &Attribute) -> Self {
        Self {
            name: attr.name.to_string(),
            ty: attr.ty.to_string(),
            required: attr.required,
            optional: attr.optional,
            computed: attr.computed,
        }
    }
}

impl TableDisplay for AttributeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Attribute", "Type", "Required", "Optional", "Computed"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.ty.clone(),
            self.required.to_string(),
            self.optional.to_string(),
            self.computed.to_string(),
        ]
    }
}

/// Print diagnostics and fail on the first error
fn check(diagnostics: &[Diagnostic]) -> Result<()> {
    print_diagnostics(diagnostics);
    if let Some(diag) = diagnostics.iter().find(|d| d.is_error()) {
        bail!("{}: {}", diag.summary, diag.detail);
    }
    Ok(())
}

fn into_state(response: StateResponse) -> Result<DynamicValue> {
    check(&response.diagnostics)?;
    Ok(response.new_state.unwrap_or_default())
}

/// Configuration value built from the apply flags
pub fn config_value(name: String, description: Option<String>, api_version: Option<String>) -> DynamicValue {
    let mut attrs = vec![("name", string_value(name))];
    if let Some(description) = description {
        attrs.push(("description", string_value(description)));
    }
    if let Some(api_version) = api_version {
        attrs.push(("api_version", string_value(api_version)));
    }
    make_state(attrs)
}

/// Validate, plan and apply a configuration against the prior state
///
/// A replacement saves the null state once the old key is deleted, so a
/// failed create leaves nothing stale in `state_file`.
pub async fn apply(
    provider: &NutanixProvider,
    state_file: &StateFile,
    prior: &DynamicValue,
    config: &DynamicValue,
) -> Result<DynamicValue> {
    check(&provider.validate_resource_config(TYPE_NAME, config))?;

    let plan = provider.plan_resource_change(TYPE_NAME, prior, config);
    check(&plan.diagnostics)?;
    let planned = plan.planned_state.unwrap_or_default();

    if &planned == prior {
        print_info("No changes.");
        return Ok(prior.clone());
    }

    let prior = if !plan.requires_replace.is_empty() && !prior.is_null() {
        print_warning(&format!(
            "{} must be replaced ({} changed)",
            get_string_attr(prior, "id"),
            plan.requires_replace.join(", ")
        ));
        let deleted = provider.apply_resource_change(TYPE_NAME, prior, &DynamicValue::Null).await;
        let state = into_state(deleted)?;
        state_file.save(&state)?;
        state
    } else {
        prior.clone()
    };

    into_state(provider.apply_resource_change(TYPE_NAME, &prior, &planned).await)
}

pub async fn execute(
    cmd: CategoryKeyCommands,
    provider: &NutanixProvider,
    state_file: &StateFile,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        CategoryKeyCommands::Apply {
            name,
            description,
            api_version,
        } => {
            let prior = state_file.load()?;
            let config = config_value(name, description, api_version);

            let state = apply(provider, state_file, &prior, &config).await?;
            state_file.save(&state)?;

            let display = CategoryKeyDisplay::from(&state);
            print_success(&format!("Category key '{}' applied", display.name));
            print_item(&display, format);
        }

        CategoryKeyCommands::Refresh => {
            let prior = state_file.load()?;
            if prior.is_null() {
                bail!("no category key in {}", state_file.path().display());
            }

            let state = into_state(provider.read_resource(TYPE_NAME, &prior).await)?;
            state_file.save(&state)?;
            print_item(&CategoryKeyDisplay::from(&state), format);
        }

        CategoryKeyCommands::Destroy => {
            let prior = state_file.load()?;
            if prior.is_null() {
                print_info("Nothing to destroy.");
                return Ok(());
            }

            let id = get_string_attr(&prior, "id");
            let state = into_state(provider.apply_resource_change(TYPE_NAME, &prior, &DynamicValue::Null).await)?;
            state_file.save(&state)?;
            print_success(&format!("Category key '{}' destroyed", id));
        }

        CategoryKeyCommands::Import { name } => {
            if !state_file.load()?.is_null() {
                bail!("{} already tracks a category key", state_file.path().display());
            }

            info!("Importing category key {}", name);
            let state = into_state(provider.import_resource_state(TYPE_NAME, &name).await)?;
            state_file.save(&state)?;
            print_success(&format!("Category key '{}' imported", name));
            print_item(&CategoryKeyDisplay::from(&state), format);
        }

        CategoryKeyCommands::Show => {
            let state = state_file.load()?;
            if state.is_null() {
                print_info("No category key in state.");
            } else {
                print_item(&CategoryKeyDisplay::from(&state), format);
            }
        }

        CategoryKeyCommands::Schema => {
            let schema = category_key_schema();
            let attrs: Vec<AttributeDisplay> = schema.attributes.iter().map(AttributeDisplay::from).collect();
            print_list(&attrs, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use nutanix_common::CategoryKey;
    use nutanix_provider::mock::{MockCall, MockNutanixClient, MockOperation};

    fn provider() -> (NutanixProvider, MockNutanixClient) {
        let mock = MockNutanixClient::new();
        (NutanixProvider::with_client(Arc::new(mock.clone())), mock)
    }

    fn state_file(dir: &tempfile::TempDir) -> StateFile {
        StateFile::new(dir.path().join("state.json"), TYPE_NAME)
    }

    #[tokio::test]
    async fn test_apply_then_reapply_is_noop() {
        let (provider, mock) = provider();
        let dir = tempfile::tempdir().unwrap();
        let file = state_file(&dir);
        let config = config_value("k1".into(), Some("team".into()), None);

        let state = apply(&provider, &file, &DynamicValue::Null, &config).await.unwrap();
        assert_eq!(get_string_attr(&state, "id"), "k1");
        assert_eq!(mock.calls().len(), 2);

        mock.clear_calls();
        let again = apply(&provider, &file, &state, &config).await.unwrap();
        assert_eq!(again, state);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rename_replaces() {
        let (provider, mock) = provider();
        let dir = tempfile::tempdir().unwrap();
        let file = state_file(&dir);
        let state = apply(&provider, &file, &DynamicValue::Null, &config_value("k1".into(), None, None))
            .await
            .unwrap();
        mock.clear_calls();

        let renamed = apply(&provider, &file, &state, &config_value("k2".into(), None, None))
            .await
            .unwrap();

        assert_eq!(get_string_attr(&renamed, "id"), "k2");
        assert_eq!(
            mock.calls(),
            vec![
                MockCall::Delete("k1".into()),
                MockCall::CreateOrUpdate(CategoryKey::new("k2")),
                MockCall::Get("k2".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_create_during_rename_clears_state() {
        let (provider, mock) = provider();
        let dir = tempfile::tempdir().unwrap();
        let file = state_file(&dir);

        let k1 = CategoryKeyCommands::Apply {
            name: "k1".into(),
            description: None,
            api_version: None,
        };
        execute(k1, &provider, &file, OutputFormat::Plain).await.unwrap();
        mock.fail_on(MockOperation::CreateOrUpdate, 500, "INTERNAL_ERROR");

        let k2 = CategoryKeyCommands::Apply {
            name: "k2".into(),
            description: None,
            api_version: None,
        };
        let err = execute(k2, &provider, &file, OutputFormat::Plain).await.unwrap_err();

        assert!(err.to_string().contains("INTERNAL_ERROR"));
        assert!(mock.category_key("k1").is_none());
        assert!(file.load().unwrap().is_null());
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn test_apply_failure_surfaces_error() {
        let (provider, mock) = provider();
        let dir = tempfile::tempdir().unwrap();
        mock.fail_on(MockOperation::CreateOrUpdate, 401, "AUTHENTICATION_REQUIRED");

        let err = apply(
            &provider,
            &state_file(&dir),
            &DynamicValue::Null,
            &config_value("k1".into(), None, None),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("AUTHENTICATION_REQUIRED"));
    }

    #[tokio::test]
    async fn test_execute_apply_and_destroy() {
        let (provider, mock) = provider();
        let dir = tempfile::tempdir().unwrap();
        let file = state_file(&dir);

        let apply_cmd = CategoryKeyCommands::Apply {
            name: "k1".into(),
            description: None,
            api_version: None,
        };
        execute(apply_cmd, &provider, &file, OutputFormat::Plain).await.unwrap();
        assert_eq!(get_string_attr(&file.load().unwrap(), "id"), "k1");

        execute(CategoryKeyCommands::Destroy, &provider, &file, OutputFormat::Plain)
            .await
            .unwrap();
        assert!(!file.path().exists());
        assert!(mock.category_key("k1").is_none());
    }

    #[test]
    fn test_display_from_state() {
        let state = make_state(vec![("id", string_value("k1")), ("name", string_value("k1"))]);
        let display = CategoryKeyDisplay::from(&state);
        assert_eq!(display.row(), vec!["k1", "k1", "", "", "false"]);
    }
}
