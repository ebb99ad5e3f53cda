//! Product Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Product;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new product
    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self.base.db().create(PRODUCT_TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Find all available products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_available = true ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find a product by its domain id
    pub async fn find_by_product_id(&self, product_id: &str) -> RepoResult<Option<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE product_id = $product_id")
            .bind(("product_id", product_id.to_string()))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Load a batch of products by id (checkout)
    pub async fn find_many(&self, product_ids: &[String]) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE product_id IN $ids")
            .bind(("ids", product_ids.to_vec()))
            .await?
            .take(0)?;
        Ok(products)
    }
}
