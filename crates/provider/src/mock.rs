//! Mock Nutanix client for unit testing
//!
//! Stores category keys in memory and records every call so tests can assert
//! exactly which remote operations a handler issued.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use nutanix_common::{CategoryKey, CategoryKeyStatus, Error, Result};

use crate::client::NutanixApi;

/// Version string the mock assigns when the request carries none
pub const MOCK_API_VERSION: &str = "3.1";

/// A recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateOrUpdate(CategoryKey),
    Get(String),
    Delete(String),
}

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CreateOrUpdate,
    Get,
    Delete,
}

#[derive(Clone, Default)]
pub struct MockNutanixClient {
    keys: Arc<Mutex<HashMap<String, CategoryKeyStatus>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    failures: Arc<Mutex<HashMap<MockOperation, (u16, String)>>>,
    upsert_response: Arc<Mutex<Option<CategoryKeyStatus>>>,
}

impl MockNutanixClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category key (for test setup)
    pub fn add_category_key(&self, key: CategoryKeyStatus) {
        let name = key.name().to_string();
        self.keys.lock().insert(name, key);
    }

    pub fn category_key(&self, name: &str) -> Option<CategoryKeyStatus> {
        self.keys.lock().get(name).cloned()
    }

    /// Make every call of `operation` fail with an API error
    pub fn fail_on(&self, operation: MockOperation, status: u16, message: impl Into<String>) {
        self.failures.lock().insert(operation, (status, message.into()));
    }

    /// Answer every upsert with `response` verbatim, leaving stored keys untouched
    pub fn respond_to_upsert_with(&self, response: CategoryKeyStatus) {
        *self.upsert_response.lock() = Some(response);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: MockCall, operation: MockOperation) -> Result<()> {
        self.calls.lock().push(call);
        match self.failures.lock().get(&operation) {
            Some((status, message)) => Err(Error::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn not_found(name: &str) -> Error {
        Error::NotFound {
            kind: "category_key".to_string(),
            id: name.to_string(),
        }
    }
}

#[async_trait]
impl NutanixApi for MockNutanixClient {
    async fn create_or_update_category_key(&self, request: &CategoryKey) -> Result<CategoryKeyStatus> {
        self.record(MockCall::CreateOrUpdate(request.clone()), MockOperation::CreateOrUpdate)?;
        if let Some(response) = self.upsert_response.lock().clone() {
            return Ok(response);
        }

        let name = request.name.clone().unwrap_or_default();
        let mut keys = self.keys.lock();
        let existing = keys.get(&name).cloned().unwrap_or_default();

        let status = CategoryKeyStatus {
            api_version: request
                .api_version
                .clone()
                .or(existing.api_version)
                .or_else(|| Some(MOCK_API_VERSION.to_string())),
            description: request.description.clone().or(existing.description),
            name: Some(name.clone()),
            system_defined: Some(existing.system_defined.unwrap_or(false)),
        };

        keys.insert(name, status.clone());
        Ok(status)
    }

    async fn get_category_key(&self, name: &str) -> Result<CategoryKeyStatus> {
        self.record(MockCall::Get(name.to_string()), MockOperation::Get)?;
        self.category_key(name).ok_or_else(|| Self::not_found(name))
    }

    async fn delete_category_key(&self, name: &str) -> Result<()> {
        self.record(MockCall::Delete(name.to_string()), MockOperation::Delete)?;
        self.keys
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(name))
    }
}
