//! Prism v3 API models

use serde::{Deserialize, Serialize};

/// Category key request body (`PUT /categories/{name}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CategoryKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }
}

/// Category key as returned by Prism
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeyStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_defined: Option<bool>,
}

impl CategoryKeyStatus {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or_default()
    }

    pub fn system_defined(&self) -> bool {
        self.system_defined.unwrap_or(false)
    }
}

/// Error body returned by v3 endpoints on failure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub code: Option<u16>,

    #[serde(default)]
    pub message_list: Vec<ApiMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorResponse {
    /// Join the messages in the list, if any
    pub fn summary(&self) -> Option<String> {
        let messages: Vec<&str> = self
            .message_list
            .iter()
            .map(|m| m.message.as_str())
            .filter(|m| !m.is_empty())
            .collect();

        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_absent_fields() {
        let body = serde_json::to_value(CategoryKey::new("k1")).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "k1" }));

        let body = serde_json::to_value(
            CategoryKey::new("k1")
                .with_description("owner")
                .with_api_version("3.1"),
        )
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "name": "k1", "description": "owner", "api_version": "3.1" })
        );
    }

    #[test]
    fn test_status_zero_values() {
        let status: CategoryKeyStatus = serde_json::from_str(r#"{"name":"k1"}"#).unwrap();
        assert_eq!(status.name(), "k1");
        assert_eq!(status.description(), "");
        assert_eq!(status.api_version(), "");
        assert!(!status.system_defined());
    }

    #[test]
    fn test_error_summary() {
        let body: ApiErrorResponse = serde_json::from_str(
            r#"{"state":"ERROR","code":404,"message_list":[{"message":"CATEGORY_NAME_NOT_FOUND","reason":"ENTITY_NOT_FOUND"}]}"#,
        )
        .unwrap();
        assert_eq!(body.code, Some(404));
        assert_eq!(body.summary().as_deref(), Some("CATEGORY_NAME_NOT_FOUND"));

        assert_eq!(ApiErrorResponse::default().summary(), None);
    }
}
