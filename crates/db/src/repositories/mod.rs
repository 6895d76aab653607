use async_trait::async_trait;
use thiserror::Error;

use catalog_core::domain::comment::{Comment, CommentId, NewComment};
use catalog_core::domain::product::{NewProduct, Product, ProductId};
use catalog_core::errors::ApplicationError;

pub mod memory;
pub mod product;

pub use memory::InMemoryCatalogRepository;
pub use product::SqlCatalogRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{entity} {id} does not exist")]
    MissingRow { entity: &'static str, id: i64 },
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Storage for the product aggregate. Products are always returned with their
/// comments in creation order.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products in fetch order (ascending id).
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Existence check that does not load the product's comments.
    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Persists every scalar field of `product`; the comment list is ignored.
    /// Fails with `MissingRow` when the product no longer exists.
    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Removes the product and all of its comments as one unit. Returns
    /// `false` when no product had that id.
    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError>;

    /// Fails with `MissingRow` when the owning product does not exist.
    async fn insert_comment(
        &self,
        product_id: ProductId,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError>;

    async fn delete_comment(&self, id: CommentId) -> Result<bool, RepositoryError>;
}
