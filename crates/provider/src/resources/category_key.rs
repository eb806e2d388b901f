//! Category Key resource handler for Terraform

use tracing::{debug, info};

use nutanix_common::{CategoryKey, Error, Result};

use super::Resource;
use crate::client::NutanixApi;
use crate::schema::{category_key_schema, ResourceSchema};
use crate::state::{bool_value, string_value, ResourceData};

pub struct CategoryKeyResource;

#[async_trait::async_trait]
impl Resource for CategoryKeyResource {
    fn type_name() -> &'static str {
        "nutanix_category_key"
    }

    fn schema() -> ResourceSchema {
        category_key_schema()
    }

    async fn create(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
        create_or_update(client, d).await
    }

    async fn read(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
        read(client, d).await
    }

    async fn update(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
        create_or_update(client, d).await
    }

    async fn delete(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
        delete(client, d).await
    }
}

/// Upsert the category key, record its name as the id, then read it back
pub async fn create_or_update(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
    debug!("Creating CategoryKey: {}", d.get_string("name"));

    let name = d
        .get_ok("name")
        .and_then(|v| v.as_string())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Validation("Please provide the required attribute name".to_string())
        })?;

    let mut request = CategoryKey::new(name.as_str());

    if let Some(v) = d.get_ok("api_version").and_then(|v| v.as_string()) {
        request.api_version = Some(v.to_string());
    }

    if let Some(desc) = d.get_ok("description").and_then(|v| v.as_string()) {
        request.description = Some(desc.to_string());
    }

    let resp = client.create_or_update_category_key(&request).await?;

    d.set_id(resp.name.filter(|n| !n.is_empty()).unwrap_or(name));

    read(client, d).await
}

/// Copy the remote category key into state
pub async fn read(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
    debug!("Reading CategoryKey: {}", d.id());

    let resp = client.get_category_key(d.id()).await?;

    d.set("api_version", string_value(resp.api_version()))?;
    d.set("name", string_value(resp.name()))?;
    d.set("description", string_value(resp.description()))?;
    d.set("system_defined", bool_value(resp.system_defined()))?;

    Ok(())
}

/// Delete the remote category key and clear the id
pub async fn delete(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()> {
    info!("Destroying the category with the name {}", d.id());

    client.delete_category_key(d.id()).await?;

    d.set_id("");
    Ok(())
}
