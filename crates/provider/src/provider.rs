//! Nutanix Terraform Provider Implementation
//!
//! The framework-facing callbacks: schema, configure, validate, plan, apply,
//! read and import. Handler failures are reported as diagnostics.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use nutanix_common::{Error, ProviderConfig, Result};

use crate::client::{NutanixApi, NutanixClient};
use crate::diagnostics::Diagnostic;
use crate::resources::{category_key::CategoryKeyResource, Resource};
use crate::schema::{self, ResourceSchema};
use crate::state::{get_bool_attr, get_int_attr, get_string_attr, DynamicValue, ResourceData};

/// Schemas of the provider block and every resource type
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    pub provider: ResourceSchema,
    pub resource_schemas: BTreeMap<String, ResourceSchema>,
}

/// Result of apply, read and import
#[derive(Debug, Clone, Default)]
pub struct StateResponse {
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StateResponse {
    fn ok(state: DynamicValue) -> Self {
        Self {
            new_state: Some(state),
            diagnostics: vec![],
        }
    }

    fn failed(summary: &str, e: &Error) -> Self {
        Self {
            new_state: None,
            diagnostics: vec![Diagnostic::error(summary, e.to_string())],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanResponse {
    pub planned_state: Option<DynamicValue>,
    /// Attributes whose change forces the resource to be replaced
    pub requires_replace: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Nutanix Terraform Provider
pub struct NutanixProvider {
    /// Client for the Prism Central API
    client: Arc<RwLock<Option<Arc<dyn NutanixApi>>>>,
    config: Arc<RwLock<ProviderConfig>>,
}

impl Default for NutanixProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl NutanixProvider {
    pub fn new() -> Self {
        Self {
            client: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(ProviderConfig::default())),
        }
    }

    /// Provider already bound to a client
    pub fn with_client(client: Arc<dyn NutanixApi>) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
            config: Arc::new(RwLock::new(ProviderConfig::default())),
        }
    }

    pub async fn config(&self) -> ProviderConfig {
        self.config.read().await.clone()
    }

    async fn get_client(&self) -> Result<Arc<dyn NutanixApi>> {
        self.client.read().await.clone().ok_or(Error::NotConfigured)
    }

    fn resource_schema(type_name: &str) -> Result<ResourceSchema> {
        match type_name {
            "nutanix_category_key" => Ok(CategoryKeyResource::schema()),
            _ => Err(Error::InvalidConfig(format!("Unknown resource type: {}", type_name))),
        }
    }

    pub fn get_provider_schema(&self) -> ProviderSchema {
        info!("GetProviderSchema called");

        ProviderSchema {
            provider: schema::provider_schema(),
            resource_schemas: [(
                CategoryKeyResource::type_name().to_string(),
                CategoryKeyResource::schema(),
            )]
            .into_iter()
            .collect(),
        }
    }

    /// Build the API client from the provider block; unset values fall back to `NUTANIX_*`
    pub async fn configure_provider(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        info!("ConfigureProvider called");

        let defaults = ProviderConfig::default();
        let port = get_int_attr(config, "port", i64::from(defaults.port));
        let wait_timeout = get_int_attr(config, "wait_timeout", defaults.wait_timeout as i64);

        let mut provider_config = ProviderConfig {
            endpoint: get_string_attr(config, "endpoint"),
            port: u16::try_from(port).unwrap_or(0),
            username: get_string_attr(config, "username"),
            password: get_string_attr(config, "password"),
            insecure: get_bool_attr(config, "insecure", false),
            wait_timeout: u64::try_from(wait_timeout).unwrap_or(defaults.wait_timeout),
        };
        provider_config.apply_env();

        let client = match NutanixClient::new(&provider_config) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to configure provider: {}", e);
                return vec![Diagnostic::error("Failed to configure Nutanix provider", e.to_string())];
            }
        };

        info!("Using Prism Central at {}", client.base_url());

        let mut diagnostics = vec![];
        if provider_config.insecure {
            diagnostics.push(Diagnostic::warning(
                "TLS verification disabled",
                format!("Certificates from {} are not verified", provider_config.endpoint),
            ));
        }

        *self.client.write().await = Some(Arc::new(client));
        *self.config.write().await = provider_config;

        diagnostics
    }

    pub fn validate_resource_config(&self, type_name: &str, config: &DynamicValue) -> Vec<Diagnostic> {
        debug!("ValidateResourceConfig called for {}", type_name);

        match Self::resource_schema(type_name) {
            Ok(schema) => schema.validate(config),
            Err(e) => vec![Diagnostic::error("Unsupported resource type", e.to_string())],
        }
    }

    /// Proposed state with unset computed attributes carried over from prior state
    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior: &DynamicValue,
        proposed: &DynamicValue,
    ) -> PlanResponse {
        debug!("PlanResourceChange called for {}", type_name);

        let schema = match Self::resource_schema(type_name) {
            Ok(schema) => schema,
            Err(e) => {
                return PlanResponse {
                    diagnostics: vec![Diagnostic::error("Unsupported resource type", e.to_string())],
                    ..Default::default()
                }
            }
        };

        let (Some(prior_map), Some(proposed_map)) = (prior.as_map(), proposed.as_map()) else {
            // create or destroy
            return PlanResponse {
                planned_state: Some(proposed.clone()),
                ..Default::default()
            };
        };

        let requires_replace: Vec<String> = ["name"]
            .into_iter()
            .filter(|attr| prior_map.get(*attr) != proposed_map.get(*attr))
            .map(str::to_string)
            .collect();

        let mut planned = proposed_map.clone();
        if requires_replace.is_empty() {
            for attribute in schema.attributes.iter().filter(|a| a.computed) {
                let unset = planned.get(attribute.name).map_or(true, DynamicValue::is_null);
                if unset {
                    if let Some(value) = prior_map.get(attribute.name) {
                        planned.insert(attribute.name.to_string(), value.clone());
                    }
                }
            }
        }

        PlanResponse {
            planned_state: Some(DynamicValue::Map(planned)),
            requires_replace,
            diagnostics: vec![],
        }
    }

    /// Create when there is no prior state, delete when there is no planned state, update otherwise
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> StateResponse {
        info!("ApplyResourceChange called for {}", type_name);

        match self.apply(type_name, prior, planned).await {
            Ok(state) => StateResponse::ok(state),
            Err(e) => {
                error!("Apply failed for {}: {}", type_name, e);
                StateResponse::failed("Failed to apply resource change", &e)
            }
        }
    }

    async fn apply(&self, type_name: &str, prior: &DynamicValue, planned: &DynamicValue) -> Result<DynamicValue> {
        let schema = Self::resource_schema(type_name)?;
        let client = self.get_client().await?;
        let client = client.as_ref();

        match (prior.is_null(), planned.is_null()) {
            (true, true) => Ok(DynamicValue::Null),
            (true, false) => {
                let mut d = ResourceData::new(schema, planned);
                d.set_id("");
                CategoryKeyResource::create(client, &mut d).await?;
                Ok(d.to_value())
            }
            (false, true) => {
                let mut d = ResourceData::new(schema, prior);
                CategoryKeyResource::delete(client, &mut d).await?;
                Ok(d.to_value())
            }
            (false, false) => {
                let prior_id = ResourceData::new(schema.clone(), prior).id().to_string();
                let mut d = ResourceData::new(schema, planned);
                if !d.exists() {
                    d.set_id(prior_id);
                }
                CategoryKeyResource::update(client, &mut d).await?;
                Ok(d.to_value())
            }
        }
    }

    pub async fn read_resource(&self, type_name: &str, current: &DynamicValue) -> StateResponse {
        info!("ReadResource called for {}", type_name);

        let result = async {
            let schema = Self::resource_schema(type_name)?;
            let client = self.get_client().await?;
            let mut d = ResourceData::new(schema, current);
            CategoryKeyResource::read(client.as_ref(), &mut d).await?;
            Ok::<_, Error>(d.to_value())
        }
        .await;

        match result {
            Ok(state) => StateResponse::ok(state),
            Err(e) => StateResponse::failed("Failed to read resource", &e),
        }
    }

    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> StateResponse {
        info!("ImportResourceState called for {} with ID {}", type_name, id);

        let result = async {
            Self::resource_schema(type_name)?;
            let client = self.get_client().await?;
            let d = CategoryKeyResource::import(client.as_ref(), id).await?;
            Ok::<_, Error>(d.to_value())
        }
        .await;

        match result {
            Ok(state) => StateResponse::ok(state),
            Err(e) => StateResponse::failed("Failed to import resource", &e),
        }
    }
}
