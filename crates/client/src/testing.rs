use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use catalog_core::catalog::SortOrder;
use catalog_core::domain::comment::{Comment, CommentId, CommentInput};
use catalog_core::domain::product::{Product, ProductId, ProductInput};
use catalog_core::errors::{ApplicationError, DomainError};
use catalog_db::repositories::InMemoryCatalogRepository;
use catalog_db::CatalogService;

use crate::api::{CatalogApi, ClientError};

/// In-process API over the real service with an in-memory repository.
#[derive(Clone)]
pub struct ServiceApi {
    pub service: CatalogService,
    pub list_calls: Arc<AtomicUsize>,
    pub offline: Arc<AtomicBool>,
}

impl ServiceApi {
    pub fn new() -> Self {
        Self {
            service: CatalogService::new(Arc::new(InMemoryCatalogRepository::default())),
            list_calls: Arc::new(AtomicUsize::new(0)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

fn to_client(error: ApplicationError) -> ClientError {
    match error {
        ApplicationError::Domain(DomainError::InvalidInput(message)) => {
            ClientError::InvalidInput(message)
        }
        other if other.is_not_found() => ClientError::NotFound(other.to_string()),
        other => ClientError::Transport(other.to_string()),
    }
}

#[async_trait]
impl CatalogApi for ServiceApi {
    async fn list_products(&self, order: SortOrder) -> Result<Vec<Product>, ClientError> {
        self.check_online()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.service.list_products(order).await.map_err(to_client)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        self.check_online()?;
        self.service.get_product(id).await.map_err(to_client)
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        self.check_online()?;
        self.service.create_product(input.clone()).await.map_err(to_client)
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        self.check_online()?;
        self.service.update_product(id, input.clone()).await.map_err(to_client)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), ClientError> {
        self.check_online()?;
        self.service.delete_product(id).await.map_err(to_client)
    }

    async fn add_comment(
        &self,
        product_id: ProductId,
        input: &CommentInput,
    ) -> Result<Comment, ClientError> {
        self.check_online()?;
        self.service.add_comment(product_id, input.clone()).await.map_err(to_client)
    }

    async fn remove_comment(
        &self,
        product_id: ProductId,
        comment_id: CommentId,
    ) -> Result<(), ClientError> {
        self.check_online()?;
        self.service.remove_comment(product_id, comment_id).await.map_err(to_client)
    }
}
