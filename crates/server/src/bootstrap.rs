use std::sync::Arc;

use catalog_core::config::{AppConfig, ConfigError, LoadOptions};
use catalog_db::repositories::SqlCatalogRepository;
use catalog_db::{connect_with_settings, migrations, CatalogService, DbPool};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: CatalogService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let service = CatalogService::new(Arc::new(SqlCatalogRepository::new(db_pool.clone())));

    Ok(Application { config, db_pool, service })
}

#[cfg(test)]
mod tests {
    use catalog_core::catalog::SortOrder;
    use catalog_core::config::{ConfigOverrides, LoadOptions};
    use catalog_core::domain::comment::CommentInput;
    use catalog_core::domain::product::{ProductInput, SizeInput};

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_rejects_non_sqlite_database_url() {
        let result = bootstrap(overrides("postgres://localhost/catalog")).await;

        let error = result.err().expect("non-sqlite url must fail");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("database.url"));
    }

    #[tokio::test]
    async fn bootstrap_applies_schema_and_serves_catalog_operations() {
        let app = bootstrap(overrides("sqlite::memory:"))
            .await
            .expect("bootstrap should succeed with an in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('product', 'product_comment')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("catalog tables should exist after bootstrap");
        assert_eq!(table_count, 2);

        let product = app
            .service
            .create_product(ProductInput {
                image_url: Some("https://img.local/a.png".to_string()),
                name: Some("A".to_string()),
                count: Some(3),
                size: Some(SizeInput { width: Some(1.0), height: Some(2.0) }),
                weight: Some("1kg".to_string()),
            })
            .await
            .expect("create through bootstrapped service");
        app.service
            .add_comment(
                product.id,
                CommentInput {
                    description: Some("hi".to_string()),
                    date: Some("2024-01-01".to_string()),
                },
            )
            .await
            .expect("comment through bootstrapped service");

        let listed = app.service.list_products(SortOrder::Name).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].comments.len(), 1);

        app.db_pool.close().await;
    }
}
