//! Database Module
//!
//! Embedded SurrealDB: RocksDB engine on disk for the server, in-memory
//! engine for tests. Single-document updates are expressed as single
//! atomic statements; the settlement flows use multi-statement
//! transactions.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "campus";
const DATABASE: &str = "campus";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database and apply schema definitions
    pub async fn open(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// Open an in-memory database (tests)
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;
        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");

        Ok(Self { db })
    }
}

/// Unique indexes on the domain identifiers
///
/// `IF NOT EXISTS` keeps startup idempotent across restarts.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE INDEX IF NOT EXISTS user_uid ON TABLE user COLUMNS uid UNIQUE;
        DEFINE INDEX IF NOT EXISTS post_post_id ON TABLE post COLUMNS post_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS product_product_id ON TABLE product COLUMNS product_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS tx_transaction_id ON TABLE pending_transaction COLUMNS transaction_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS deal_deal_id ON TABLE deal COLUMNS deal_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS notification_id ON TABLE notification COLUMNS notification_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS vcode_key ON TABLE verification_code COLUMNS key UNIQUE;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}
