//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod category_key;

use nutanix_common::Result;

use crate::client::NutanixApi;
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

/// Trait for resource operations
///
/// Handlers mutate the `ResourceData` in place; a cleared identifier marks
/// the resource as gone.
#[async_trait::async_trait]
pub trait Resource {
    /// Resource type name
    fn type_name() -> &'static str;

    fn schema() -> ResourceSchema;

    /// Create a new resource
    async fn create(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()>;

    /// Read an existing resource
    async fn read(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()>;

    /// Update an existing resource
    async fn update(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()>;

    /// Delete a resource
    async fn delete(client: &dyn NutanixApi, d: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote object: the id is taken as-is, then read
    async fn import(client: &dyn NutanixApi, id: &str) -> Result<ResourceData> {
        let mut d = ResourceData::new(Self::schema(), &crate::state::DynamicValue::Null);
        d.set_id(id);
        Self::read(client, &mut d).await?;
        Ok(d)
    }
}
