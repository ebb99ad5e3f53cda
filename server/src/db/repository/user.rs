//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::User;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new user
    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Find a user by uid
    pub async fn find_by_uid(&self, uid: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE uid = $uid")
            .bind(("uid", uid.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find a user by uid or fail
    pub async fn get_by_uid(&self, uid: &str) -> RepoResult<User> {
        self.find_by_uid(uid)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", uid)))
    }

    /// Toggle a product in the user's favorites, mirrored onto the
    /// product's fav_count. Both sides move in one transaction; a missing
    /// product throws inside the transaction, so the user row is never
    /// touched.
    ///
    /// Returns (is_favorited, new_fav_count).
    pub async fn toggle_favorite(&self, uid: &str, product_id: &str) -> RepoResult<(bool, i64)> {
        let user = self.get_by_uid(uid).await?;
        let is_favorited = user.favorites.iter().any(|p| p == product_id);

        let (user_op, count_op) = if is_favorited {
            ("-=", "-=")
        } else {
            ("+=", "+=")
        };
        let query = format!(
            "BEGIN TRANSACTION;
             LET $p = (SELECT * FROM product WHERE product_id = $product_id)[0];
             IF $p = NONE {{ THROW \"product_not_found\" }};
             UPDATE user SET favorites {user_op} $product_id WHERE uid = $uid;
             UPDATE product SET fav_count {count_op} 1 WHERE product_id = $product_id RETURN AFTER;
             COMMIT TRANSACTION;"
        );

        #[derive(serde::Deserialize)]
        struct FavCount {
            fav_count: i64,
        }

        let map_throw = |err: surrealdb::Error| {
            if err.to_string().contains("product_not_found") {
                RepoError::NotFound(format!("Product {} not found", product_id))
            } else {
                RepoError::from(err)
            }
        };

        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("uid", uid.to_string()))
            .bind(("product_id", product_id.to_string()))
            .await
            .map_err(map_throw)?;
        if let Some(err) = result.take_errors().into_values().next() {
            return Err(map_throw(err));
        }
        // Slots: LET, IF, user update, product update
        let counts: Vec<FavCount> = result.take(3)?;
        let fav_count = counts
            .into_iter()
            .next()
            .map(|c| c.fav_count)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", product_id)))?;

        Ok((!is_favorited, fav_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::Product;
    use crate::db::repository::ProductRepository;

    async fn setup() -> (UserRepository, ProductRepository) {
        let db = DbService::open_in_memory().await.unwrap();
        (
            UserRepository::new(db.db.clone()),
            ProductRepository::new(db.db.clone()),
        )
    }

    #[tokio::test]
    async fn test_favorite_toggle_moves_both_sides() {
        let (users, products) = setup().await;
        users.create(User::new("fan", "Fay", "Fan")).await.unwrap();
        products
            .create(Product::new("mug", "seller", "Campus mug", 80))
            .await
            .unwrap();

        let (is_favorited, fav_count) = users.toggle_favorite("fan", "mug").await.unwrap();
        assert!(is_favorited);
        assert_eq!(fav_count, 1);
        let user = users.get_by_uid("fan").await.unwrap();
        assert_eq!(user.favorites, vec!["mug".to_string()]);

        let (is_favorited, fav_count) = users.toggle_favorite("fan", "mug").await.unwrap();
        assert!(!is_favorited);
        assert_eq!(fav_count, 0);
        let user = users.get_by_uid("fan").await.unwrap();
        assert!(user.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_missing_product_leaves_user_untouched() {
        let (users, _products) = setup().await;
        users.create(User::new("fan", "Fay", "Fan")).await.unwrap();

        let err = users.toggle_favorite("fan", "ghost").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));

        // The failed toggle must not have committed anything
        let user = users.get_by_uid("fan").await.unwrap();
        assert!(user.favorites.is_empty());
    }
}
