//! Typed access to the catalog REST surface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use catalog_core::catalog::SortOrder;
use catalog_core::domain::comment::{Comment, CommentId, CommentInput};
use catalog_core::domain::product::{Product, ProductId, ProductInput};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no product is loaded")]
    NoProductLoaded,
}

/// The catalog operations as seen from a client.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self, order: SortOrder) -> Result<Vec<Product>, ClientError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError>;

    async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError>;

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ClientError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), ClientError>;

    async fn add_comment(
        &self,
        product_id: ProductId,
        input: &CommentInput,
    ) -> Result<Comment, ClientError>;

    async fn remove_comment(
        &self,
        product_id: ProductId,
        comment_id: CommentId,
    ) -> Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpCatalogApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCatalogApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|error| ClientError::Transport(format!("failed to build client: {error}")))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    async fn send(&self, request: RequestBuilder, route: &str) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|error| ClientError::Transport(format!("{route} unreachable: {error}")))?;

        let status = response.status();
        debug!(event_name = "catalog.client.response", route, status = status.as_u16());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_status(status, &body, route))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        route: &str,
    ) -> Result<T, ClientError> {
        self.send(request, route).await?.json::<T>().await.map_err(|error| {
            ClientError::Transport(format!("invalid response from {route}: {error}"))
        })
    }
}

/// Maps a failed response onto the client error taxonomy, preferring the
/// server's `message` field when the body carries one.
pub fn error_from_status(status: StatusCode, body: &str, route: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST => ClientError::InvalidInput(message),
        _ => ClientError::Transport(format!("{route} failed ({}): {message}", status.as_u16())),
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_products(&self, order: SortOrder) -> Result<Vec<Product>, ClientError> {
        let mut request = self.request(Method::GET, "/products");
        if let Some(sort_by) = order.as_query() {
            request = request.query(&[("sortBy", sort_by)]);
        }
        self.send_json(request, "GET /products").await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        let request = self.request(Method::GET, &format!("/products/{id}"));
        self.send_json(request, "GET /products/{id}").await
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        let request = self.request(Method::POST, "/products").json(input);
        self.send_json(request, "POST /products").await
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        let request = self.request(Method::PATCH, &format!("/products/{id}")).json(input);
        self.send_json(request, "PATCH /products/{id}").await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, &format!("/products/{id}"));
        self.send(request, "DELETE /products/{id}").await.map(|_| ())
    }

    async fn add_comment(
        &self,
        product_id: ProductId,
        input: &CommentInput,
    ) -> Result<Comment, ClientError> {
        let request =
            self.request(Method::POST, &format!("/products/{product_id}/comments")).json(input);
        self.send_json(request, "POST /products/{id}/comments").await
    }

    async fn remove_comment(
        &self,
        product_id: ProductId,
        comment_id: CommentId,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::DELETE, &format!("/products/{product_id}/comments/{comment_id}"));
        self.send(request, "DELETE /products/{id}/comments/{comment_id}").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use catalog_core::catalog::SortOrder;

    use super::{error_from_status, CatalogApi, ClientError, HttpCatalogApi};

    #[test]
    fn not_found_uses_server_message() {
        let body = r#"{"statusCode":404,"error":"Not Found","message":"Product with id 3 not found","correlationId":"c"}"#;

        let error = error_from_status(StatusCode::NOT_FOUND, body, "GET /products/{id}");

        assert_eq!(error, ClientError::NotFound("Product with id 3 not found".to_string()));
    }

    #[test]
    fn bad_request_maps_to_invalid_input() {
        let body = r#"{"statusCode":400,"error":"Bad Request","message":"count must be greater than zero"}"#;

        let error = error_from_status(StatusCode::BAD_REQUEST, body, "POST /products");

        assert_eq!(error, ClientError::InvalidInput("count must be greater than zero".to_string()));
    }

    #[test]
    fn other_failures_are_transport_errors_with_raw_body() {
        let error = error_from_status(StatusCode::BAD_GATEWAY, "upstream down", "GET /products");

        assert_eq!(
            error,
            ClientError::Transport("GET /products failed (502): upstream down".to_string())
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpCatalogApi::new("http://localhost:3000/").expect("client");

        assert_eq!(api.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let api = HttpCatalogApi::new("http://127.0.0.1:9").expect("client");

        let error = api.list_products(SortOrder::Count).await.expect_err("nothing listens");

        assert!(matches!(error, ClientError::Transport(_)));
    }
}
