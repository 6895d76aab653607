use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use catalog_core::domain::comment::{Comment, CommentId, NewComment};
use catalog_core::domain::product::{NewProduct, Product, ProductId, Size};

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, image_url, name, count, size_width, size_height, weight";
const COMMENT_COLUMNS: &str = "id, product_id, description, date";

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn comments_for(&self, product_id: ProductId) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM product_comment WHERE product_id = ? ORDER BY id ASC"
        ))
        .bind(product_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_comment).collect()
    }
}

fn decode<T>(row: &SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: ProductId(decode(row, "id")?),
        image_url: decode(row, "image_url")?,
        name: decode(row, "name")?,
        count: decode(row, "count")?,
        size: Size { width: decode(row, "size_width")?, height: decode(row, "size_height")? },
        weight: decode(row, "weight")?,
        comments: Vec::new(),
    })
}

fn row_to_comment(row: &SqliteRow) -> Result<Comment, RepositoryError> {
    let date_str: String = decode(row, "date")?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("date `{date_str}`: {e}")))?;

    Ok(Comment {
        id: CommentId(decode(row, "id")?),
        product_id: ProductId(decode(row, "product_id")?),
        description: decode(row, "description")?,
        date,
    })
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let product_rows =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id ASC"))
                .fetch_all(&self.pool)
                .await?;
        let comment_rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM product_comment ORDER BY product_id ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut products = product_rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()?;
        let mut comments = comment_rows.iter().map(row_to_comment).collect::<Result<Vec<_>, _>>()?;

        // Both lists are ordered by product id, so comments can be handed out
        // in a single pass.
        let mut remaining = comments.drain(..).peekable();
        for product in &mut products {
            while let Some(comment) = remaining.next_if(|comment| comment.product_id <= product.id)
            {
                if comment.product_id == product.id {
                    product.comments.push(comment);
                }
            }
        }

        Ok(products)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut product = row_to_product(&row)?;
        product.comments = self.comments_for(id).await?;
        Ok(Some(product))
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product WHERE id = ?)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists == 1)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO product (image_url, name, count, size_width, size_height, weight,
                                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.image_url)
        .bind(&product.name)
        .bind(product.count)
        .bind(product.size.width)
        .bind(product.size.height)
        .bind(&product.weight)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Product::from_new(ProductId(result.last_insert_rowid()), product))
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product
             SET image_url = ?, name = ?, count = ?, size_width = ?, size_height = ?,
                 weight = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&product.image_url)
        .bind(&product.name)
        .bind(product.count)
        .bind(product.size.width)
        .bind(product.size.height)
        .bind(&product.weight)
        .bind(Utc::now().to_rfc3339())
        .bind(product.id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::MissingRow { entity: "product", id: product.id.0 });
        }

        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_comment WHERE product_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        let deleted =
            sqlx::query("DELETE FROM product WHERE id = ?").bind(id.0).execute(&mut *tx).await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM product_comment WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_comment).transpose()
    }

    async fn insert_comment(
        &self,
        product_id: ProductId,
        comment: NewComment,
    ) -> Result<Comment, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO product_comment (product_id, description, date) VALUES (?, ?, ?)",
        )
        .bind(product_id.0)
        .bind(&comment.description)
        .bind(comment.date.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepositoryError::MissingRow { entity: "product", id: product_id.0 }
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(Comment::from_new(CommentId(result.last_insert_rowid()), product_id, comment))
    }

    async fn delete_comment(&self, id: CommentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_comment WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
