use std::collections::BTreeMap;

use tokio::sync::RwLock;

use catalog_core::domain::comment::{Comment, CommentId, NewComment};
use catalog_core::domain::product::{NewProduct, Product, ProductId};

use super::{CatalogRepository, RepositoryError};

#[derive(Default)]
struct CatalogTables {
    products: BTreeMap<ProductId, Product>,
    comments: BTreeMap<CommentId, Comment>,
    last_product_id: i64,
    last_comment_id: i64,
}

impl CatalogTables {
    fn with_comments(&self, product: &Product) -> Product {
        let mut product = product.clone();
        product.comments = self
            .comments
            .values()
            .filter(|comment| comment.product_id == product.id)
            .cloned()
            .collect();
        product
    }
}

/// Map-backed repository with the same id and ownership semantics as the SQL
/// implementation: ids increase monotonically and are never reused, and a
/// product delete drops its comments under one write lock.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<CatalogTables>,
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().map(|product| tables.with_comments(product)).collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).map(|product| tables.with_comments(product)))
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.tables.read().await.products.contains_key(&id))
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_product_id += 1;
        let product = Product::from_new(ProductId(tables.last_product_id), product);
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.products.get_mut(&product.id) else {
            return Err(RepositoryError::MissingRow { entity: "product", id: product.id.0 });
        };

        *stored = Product { comments: Vec::new(), ..product.clone() };
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.products.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, comment| comment.product_id != id);
        Ok(true)
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).cloned())
    }

    async fn insert_comment(
        &self,
        product_id: ProductId,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&product_id) {
            return Err(RepositoryError::MissingRow { entity: "product", id: product_id.0 });
        }

        tables.last_comment_id += 1;
        let comment = Comment::from_new(CommentId(tables.last_comment_id), product_id, comment);
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: CommentId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.remove(&id).is_some())
    }
}
