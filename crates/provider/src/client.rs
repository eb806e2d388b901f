//! Client for the Prism Central v3 REST API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use nutanix_common::{
    ApiErrorResponse, CategoryKey, CategoryKeyStatus, Error, ProviderConfig, Result,
};

const CATEGORY_KEY_KIND: &str = "category_key";

/// Remote operations the resource handlers depend on
#[async_trait]
pub trait NutanixApi: Send + Sync {
    /// `PUT /categories/{name}`
    async fn create_or_update_category_key(&self, request: &CategoryKey) -> Result<CategoryKeyStatus>;

    /// `GET /categories/{name}`
    async fn get_category_key(&self, name: &str) -> Result<CategoryKeyStatus>;

    /// `DELETE /categories/{name}`
    async fn delete_category_key(&self, name: &str) -> Result<()>;
}

/// HTTP client for a single Prism Central endpoint
pub struct NutanixClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl NutanixClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn category_url(&self, name: &str) -> String {
        format!("{}/categories/{}", self.base_url, urlencoding::encode(name))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");

        if self.username.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.username, Some(&self.password))
        }
    }

    /// Turn a non-success response into an error
    async fn check(response: Response, id: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                kind: CATEGORY_KEY_KIND.to_string(),
                id: id.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|e| e.summary())
            .unwrap_or(body);

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a success body; malformed JSON is a serialization error
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl NutanixApi for NutanixClient {
    async fn create_or_update_category_key(&self, request: &CategoryKey) -> Result<CategoryKeyStatus> {
        let name = request.name.as_deref().unwrap_or_default();
        let url = self.category_url(name);
        debug!("PUT {}", url);

        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(request)
            .send()
            .await?;
        let response = Self::check(response, name).await?;

        Self::decode(response).await
    }

    async fn get_category_key(&self, name: &str) -> Result<CategoryKeyStatus> {
        let url = self.category_url(name);
        debug!("GET {}", url);

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let response = Self::check(response, name).await?;

        Self::decode(response).await
    }

    async fn delete_category_key(&self, name: &str) -> Result<()> {
        let url = self.category_url(name);
        debug!("DELETE {}", url);

        let response = self.request(reqwest::Method::DELETE, &url).send().await?;
        Self::check(response, name).await?;
        Ok(())
    }
}
