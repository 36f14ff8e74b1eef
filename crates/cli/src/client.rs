//! HTTP client for the yarnshop API.
//!
//! Catalog responses are parsed loosely and validated into [`Product`]s at
//! this boundary; malformed entries are quarantined in the returned
//! [`CatalogLoad`].

use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use yarnshop_core::{CatalogLoad, Product, ProductError, ProductId, validate_catalog};

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL cannot be joined with an endpoint path.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The requested resource does not exist.
    #[error("not found")]
    NotFound,

    /// API returned an error response.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// A product in the response failed validation.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),
}

/// Account and product totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Stats {
    pub users: i64,
    pub products: i64,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// yarnshop API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    /// Send `token` as a bearer token with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut request = self.client.get(self.url(path)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Self::handle_response(request.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.client.post(self.url(path)?).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch the catalog, quarantining malformed entries.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not an array.
    pub async fn products(&self) -> Result<CatalogLoad, ApiError> {
        let entries: Vec<Value> = self.get("api/products").await?;
        Ok(validate_catalog(entries))
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id and
    /// `ApiError::InvalidProduct` if the entry is malformed.
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let entry: Value = self.get(&format!("api/products/{id}")).await?;
        Ok(Product::from_json(&entry)?)
    }

    /// Create an account, returning the server's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the server's message on rejection.
    pub async fn register(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response: MessageResponse = self
            .post("api/auth/register", &Credentials { username, password })
            .await?;
        Ok(response.message)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with status 401 for wrong credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response: TokenResponse = self
            .post("api/auth/login", &Credentials { username, password })
            .await?;
        Ok(response.token)
    }

    /// Fetch account and product totals.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get("api/stats").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = ApiClient::new("http://localhost:5004").unwrap();
        assert_eq!(
            client.url("api/products").unwrap().as_str(),
            "http://localhost:5004/api/products"
        );

        let client = ApiClient::new("https://shop.example.com/backend").unwrap();
        assert_eq!(
            client.url("api/products/3").unwrap().as_str(),
            "https://shop.example.com/backend/api/products/3"
        );
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("localhost"),
            Err(ApiError::Url(_))
        ));
    }
}
