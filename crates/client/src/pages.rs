//! Page-level state synchronization: fetch, render from the store, mutate
//! through the API, then refetch or patch the store.

use chrono::{DateTime, Utc};
use tracing::warn;

use catalog_core::catalog::SortOrder;
use catalog_core::domain::comment::{Comment, CommentId, CommentInput};
use catalog_core::domain::product::{Product, ProductId, ProductInput};

use crate::api::{CatalogApi, ClientError};
use crate::state::StateStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Failed,
}

/// Where a page asks the host to go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    ProductList,
}

/// Product listing with sort selection. Every successful mutation refetches
/// the list with the current sort.
pub struct ProductListPage<A, S> {
    api: A,
    store: S,
    sort: SortOrder,
    status: LoadStatus,
    error: Option<String>,
}

impl<A: CatalogApi, S: StateStore> ProductListPage<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self { api, store, sort: SortOrder::default(), status: LoadStatus::Idle, error: None }
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn products(&self) -> Vec<Product> {
        self.store.products()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load(&mut self, sort: SortOrder) -> Result<(), ClientError> {
        self.sort = sort;
        self.refresh().await
    }

    /// Changing the sort always refetches; ordering is the server's job.
    pub async fn set_sort(&mut self, sort: SortOrder) -> Result<(), ClientError> {
        self.load(sort).await
    }

    pub async fn create(&mut self, input: ProductInput) -> Result<Product, ClientError> {
        let created = self.api.create_product(&input).await.map_err(|error| {
            self.record_failure("Failed to add product", &error);
            error
        })?;
        self.refresh().await?;
        Ok(created)
    }

    pub async fn delete(&mut self, id: ProductId) -> Result<(), ClientError> {
        self.api.delete_product(id).await.map_err(|error| {
            self.record_failure("Failed to delete product", &error);
            error
        })?;
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.status = LoadStatus::Loading;
        self.error = None;

        match self.api.list_products(self.sort).await {
            Ok(products) => {
                self.store.set_products(products);
                self.status = LoadStatus::Idle;
                Ok(())
            }
            Err(error) => {
                self.status = LoadStatus::Failed;
                self.record_failure("Failed to load products", &error);
                Err(error)
            }
        }
    }

    fn record_failure(&mut self, context: &str, error: &ClientError) {
        warn!(event_name = "catalog.client.list_page_failed", context, error = %error);
        self.error = Some(format!("{context}: {error}"));
    }
}

/// A single product with its comments. Comment edits patch the store in
/// place instead of refetching the product.
pub struct ProductViewPage<A, S> {
    api: A,
    store: S,
    product_id: Option<ProductId>,
    status: LoadStatus,
    error: Option<String>,
    navigation: Option<Navigation>,
}

impl<A: CatalogApi, S: StateStore> ProductViewPage<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            product_id: None,
            status: LoadStatus::Idle,
            error: None,
            navigation: None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn product(&self) -> Option<Product> {
        self.store.current()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.product_id.map(|id| self.store.comments(id)).unwrap_or_default()
    }

    /// Returns and clears a pending navigation request.
    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    /// On failure the page records the error, drops any product on display and
    /// asks to return to the listing.
    pub async fn load(&mut self, id: ProductId) -> Result<(), ClientError> {
        self.status = LoadStatus::Loading;
        self.error = None;

        match self.api.get_product(id).await {
            Ok(product) => {
                let comments = product.comments.clone();
                self.store.set_current(product);
                self.store.set_comments(id, comments);
                self.product_id = Some(id);
                self.status = LoadStatus::Idle;
                Ok(())
            }
            Err(error) => {
                self.store.clear_current();
                self.product_id = None;
                self.status = LoadStatus::Failed;
                self.record_failure("Failed to load product", &error);
                self.navigation = Some(Navigation::ProductList);
                Err(error)
            }
        }
    }

    pub async fn update(&mut self, input: ProductInput) -> Result<Product, ClientError> {
        let id = self.product_id.ok_or(ClientError::NoProductLoaded)?;

        let updated = self.api.update_product(id, &input).await.map_err(|error| {
            self.record_failure("Failed to update product", &error);
            error
        })?;
        self.store.set_current(updated.clone());
        Ok(updated)
    }

    /// Blank descriptions are rejected locally without a request.
    pub async fn add_comment(
        &mut self,
        description: &str,
        date: DateTime<Utc>,
    ) -> Result<Comment, ClientError> {
        let id = self.product_id.ok_or(ClientError::NoProductLoaded)?;
        let description = description.trim();
        if description.is_empty() {
            return Err(ClientError::InvalidInput("description must not be empty".to_string()));
        }

        let input = CommentInput::new(description, date);
        let comment = self.api.add_comment(id, &input).await.map_err(|error| {
            self.record_failure("Failed to add comment", &error);
            error
        })?;
        self.store.push_comment(comment.clone());
        Ok(comment)
    }

    pub async fn remove_comment(&mut self, comment_id: CommentId) -> Result<(), ClientError> {
        let id = self.product_id.ok_or(ClientError::NoProductLoaded)?;

        self.api.remove_comment(id, comment_id).await.map_err(|error| {
            self.record_failure("Failed to delete comment", &error);
            error
        })?;
        self.store.remove_comment(id, comment_id);
        Ok(())
    }

    fn record_failure(&mut self, context: &str, error: &ClientError) {
        warn!(event_name = "catalog.client.view_page_failed", context, error = %error);
        self.error = Some(format!("{context}: {error}"));
    }
}
