//! Catalog operations over the product aggregate.
//!
//! Every operation is stateless given its inputs and the repository. Domain
//! failures (`NotFound`, `InvalidInput`) are returned to the caller as-is;
//! repository failures surface as `ApplicationError::Persistence`.

use std::sync::Arc;

use tracing::{debug, info};

use catalog_core::catalog::{sort_products, SortOrder};
use catalog_core::domain::comment::{Comment, CommentId, CommentInput};
use catalog_core::domain::product::{Product, ProductId, ProductInput};
use catalog_core::errors::{ApplicationError, DomainError};

use crate::repositories::{CatalogRepository, RepositoryError};

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_products(&self, order: SortOrder) -> Result<Vec<Product>, ApplicationError> {
        let mut products = self.repository.list_products().await?;
        sort_products(&mut products, order);

        debug!(
            event_name = "catalog.product.listed",
            sort_order = ?order,
            product_count = products.len(),
            "listed products"
        );
        Ok(products)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApplicationError> {
        self.repository
            .find_product(id)
            .await?
            .ok_or_else(|| DomainError::ProductNotFound(id).into())
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product, ApplicationError> {
        let product = input.into_new_product()?;
        let created = self.repository.insert_product(product).await?;

        info!(
            event_name = "catalog.product.created",
            product_id = %created.id,
            name = %created.name,
            "product created"
        );
        Ok(created)
    }

    /// Overwrites the supplied fields only. A supplied `size` replaces the
    /// stored composite as a whole.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, ApplicationError> {
        let mut product = self.get_product(id).await?;
        let changes = input.into_changes()?;

        product.apply(changes);
        self.repository.update_product(&product).await.map_err(product_missing(id))?;

        info!(event_name = "catalog.product.updated", product_id = %id, "product updated");
        self.get_product(id).await
    }

    /// Deletes the product together with its comments in one transaction.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApplicationError> {
        self.ensure_product_exists(id).await?;

        if !self.repository.delete_product(id).await? {
            return Err(DomainError::ProductNotFound(id).into());
        }

        info!(
            event_name = "catalog.product.deleted",
            product_id = %id,
            "product and comments deleted"
        );
        Ok(())
    }

    /// The returned comment carries its owner's id only, never the owner's
    /// comment collection.
    pub async fn add_comment(
        &self,
        product_id: ProductId,
        input: CommentInput,
    ) -> Result<Comment, ApplicationError> {
        self.ensure_product_exists(product_id).await?;
        let comment = input.into_new_comment()?;
        let created = self
            .repository
            .insert_comment(product_id, comment)
            .await
            .map_err(product_missing(product_id))?;

        info!(
            event_name = "catalog.comment.created",
            product_id = %product_id,
            comment_id = %created.id,
            "comment added"
        );
        Ok(created)
    }

    /// Fails with `CommentNotFound` both when the comment does not exist and
    /// when it belongs to a different product.
    pub async fn remove_comment(
        &self,
        product_id: ProductId,
        comment_id: CommentId,
    ) -> Result<(), ApplicationError> {
        let not_found =
            || ApplicationError::from(DomainError::CommentNotFound { product_id, comment_id });

        let comment = self.repository.find_comment(comment_id).await?.ok_or_else(not_found)?;
        if comment.product_id != product_id {
            debug!(
                event_name = "catalog.comment.owner_mismatch",
                product_id = %product_id,
                comment_id = %comment_id,
                owner_id = %comment.product_id,
                "comment removal rejected for foreign product"
            );
            return Err(not_found());
        }

        if !self.repository.delete_comment(comment_id).await? {
            return Err(not_found());
        }

        info!(
            event_name = "catalog.comment.deleted",
            product_id = %product_id,
            comment_id = %comment_id,
            "comment removed"
        );
        Ok(())
    }

    async fn ensure_product_exists(&self, id: ProductId) -> Result<(), ApplicationError> {
        if self.repository.product_exists(id).await? {
            Ok(())
        } else {
            Err(DomainError::ProductNotFound(id).into())
        }
    }
}

/// A product removed between lookup and write is reported as not found, not
/// as a storage failure.
fn product_missing(id: ProductId) -> impl FnOnce(RepositoryError) -> ApplicationError {
    move |error| match error {
        RepositoryError::MissingRow { .. } => DomainError::ProductNotFound(id).into(),
        other => other.into(),
    }
}
