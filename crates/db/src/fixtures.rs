use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract { id: 1, name: "Desk lamp", count: 12, comment_count: 2 },
    SeedProductContract { id: 2, name: "Armchair", count: 3, comment_count: 1 },
    SeedProductContract { id: 3, name: "Bookshelf", count: 7, comment_count: 0 },
    SeedProductContract { id: 4, name: "Armchair", count: 1, comment_count: 0 },
];

const SEED_COMMENT_IDS: &[i64] = &[1, 2, 3];

/// Demo catalog used by `catalog seed` and local development.
///
/// Rows carry fixed ids, so loading twice leaves the tables unchanged.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            products_seeded: SEED_PRODUCTS.len(),
            comments_seeded: SEED_COMMENT_IDS.len(),
        })
    }

    /// Checks that every seeded product is present with its expected comments.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for product in SEED_PRODUCTS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM product WHERE id = ?1 AND name = ?2 AND count = ?3)",
            )
            .bind(product.id)
            .bind(product.name)
            .bind(product.count)
            .fetch_one(pool)
            .await?;

            let comment_count: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM product_comment WHERE product_id = ?1")
                    .bind(product.id)
                    .fetch_one(pool)
                    .await?;

            checks.push(SeedCheck {
                product_id: product.id,
                name: product.name,
                present: exists == 1 && comment_count == product.comment_count,
            });
        }

        let all_present = checks.iter().all(|check| check.present);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the seeded products and every comment they own, comments first.
    /// Comments on other products are left alone even when their ids collide
    /// with seed comment ids.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let product_ids = sql_array_from_ids(SEED_PRODUCTS.iter().map(|product| product.id));

        sqlx::query(&format!("DELETE FROM product_comment WHERE product_id IN {product_ids}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM product WHERE id IN {product_ids}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedProductContract {
    id: i64,
    name: &'static str,
    count: i64,
    comment_count: i64,
}

fn sql_array_from_ids(ids: impl Iterator<Item = i64>) -> String {
    let joined = ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub comments_seeded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCheck {
    pub product_id: i64,
    pub name: &'static str,
    pub present: bool,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<SeedCheck>,
}
