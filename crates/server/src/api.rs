//! REST surface of the product catalog.
//!
//! - `GET    /products?sortBy=name|count`               list products
//! - `POST   /products`                                 create a product
//! - `GET    /products/{id}`                            fetch one product
//! - `PATCH  /products/{id}`                            overwrite supplied fields
//! - `DELETE /products/{id}`                            delete product and comments
//! - `POST   /products/{id}/comments`                   add a comment
//! - `DELETE /products/{id}/comments/{comment_id}`      remove an owned comment

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{
        header::{InvalidHeaderValue, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use catalog_core::catalog::SortOrder;
use catalog_core::domain::comment::{Comment, CommentId, CommentInput};
use catalog_core::domain::product::{Product, ProductId, ProductInput};
use catalog_core::errors::{ApplicationError, InterfaceError};
use catalog_db::{CatalogService, DbPool};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::health;

#[derive(Clone)]
pub struct ApiState {
    service: CatalogService,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self(InterfaceError::BadRequest { message, correlation_id: new_correlation_id() })
    }

    fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        let interface = error.into_interface(new_correlation_id());
        if matches!(
            interface,
            InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. }
        ) {
            error!(
                event_name = "catalog.api.request_failed",
                correlation_id = %interface.correlation_id(),
                error = %interface.message(),
                "catalog request failed"
            );
        }
        Self(interface)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side details stay in the log; clients get the generic text.
        let message = if status.is_server_error() {
            self.0.user_message().to_string()
        } else {
            self.0.message().to_string()
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).patch(update_product).delete(delete_product))
        .route("/products/{id}/comments", post(add_comment))
        .route("/products/{id}/comments/{comment_id}", delete(remove_comment))
        .with_state(ApiState { service })
}

/// Full application router: catalog routes, health, CORS and request tracing.
pub fn app(
    service: CatalogService,
    db_pool: DbPool,
    cors_allowed_origin: Option<&str>,
) -> Result<Router, InvalidHeaderValue> {
    Ok(router(service)
        .merge(health::router(db_pool))
        .layer(cors_layer(cors_allowed_origin)?)
        .layer(TraceLayer::new_for_http()))
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Ok(match allowed_origin {
        Some(origin) => layer.allow_origin(origin.parse::<HeaderValue>()?),
        None => layer.allow_origin(Any),
    })
}

async fn list_products(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let order = SortOrder::from_query(query.sort_by.as_deref());
    Ok(Json(state.service.list_products(order).await?))
}

async fn get_product(
    State(state): State<ApiState>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.service.get_product(id).await?))
}

async fn create_product(
    State(state): State<ApiState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = payload?;
    let product = state.service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<ApiState>,
    id: Result<Path<ProductId>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    Ok(Json(state.service.update_product(id, input).await?))
}

async fn delete_product(
    State(state): State<ApiState>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.service.delete_product(id).await?;
    Ok(StatusCode::OK)
}

async fn add_comment(
    State(state): State<ApiState>,
    id: Result<Path<ProductId>, PathRejection>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Path(product_id) = id?;
    let Json(input) = payload?;
    let comment = state.service.add_comment(product_id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn remove_comment(
    State(state): State<ApiState>,
    ids: Result<Path<(ProductId, CommentId)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((product_id, comment_id)) = ids?;
    state.service.remove_comment(product_id, comment_id).await?;
    info!(
        event_name = "catalog.api.comment_removed",
        product_id = %product_id,
        comment_id = %comment_id,
        "comment removal served"
    );
    Ok(StatusCode::OK)
}
