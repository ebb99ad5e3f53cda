//! Post Repository
//!
//! Counter bumps are single atomic statements; the like/bookmark toggles
//! update the post set and the user's mirrored set inside one database
//! transaction so the two sides cannot diverge.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Comment, Post, PostWithAuthor};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const POST_TABLE: &str = "post";

/// The two mirrored membership sets on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSet {
    Likes,
    Bookmarks,
}

impl PostSet {
    /// (field on post, mirrored field on user)
    fn fields(self) -> (&'static str, &'static str) {
        match self {
            PostSet::Likes => ("likes", "likes"),
            PostSet::Bookmarks => ("bookmarks", "bookmarks"),
        }
    }
}

#[derive(Clone)]
pub struct PostRepository {
    base: BaseRepository,
}

impl PostRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new post
    pub async fn create(&self, post: Post) -> RepoResult<Post> {
        let created: Option<Post> = self.base.db().create(POST_TABLE).content(post).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create post".to_string()))
    }

    /// Find a post by its domain id
    pub async fn find_by_post_id(&self, post_id: &str) -> RepoResult<Option<Post>> {
        let posts: Vec<Post> = self
            .base
            .db()
            .query("SELECT * FROM post WHERE post_id = $post_id")
            .bind(("post_id", post_id.to_string()))
            .await?
            .take(0)?;
        Ok(posts.into_iter().next())
    }

    /// Find a post with the author link expanded
    pub async fn find_with_author(&self, post_id: &str) -> RepoResult<Option<PostWithAuthor>> {
        let posts: Vec<PostWithAuthor> = self
            .base
            .db()
            .query("SELECT * FROM post WHERE post_id = $post_id FETCH author")
            .bind(("post_id", post_id.to_string()))
            .await?
            .take(0)?;
        Ok(posts.into_iter().next())
    }

    /// All posts with authors expanded, newest first
    ///
    /// Ranking happens in the feed engine; the repository only joins.
    pub async fn list_with_authors(&self) -> RepoResult<Vec<PostWithAuthor>> {
        let posts: Vec<PostWithAuthor> = self
            .base
            .db()
            .query("SELECT * FROM post ORDER BY created_at DESC FETCH author")
            .await?
            .take(0)?;
        Ok(posts)
    }

    /// Toggle `uid` in the given post set and mirror the post id on the
    /// user, both inside a single transaction. `add` = insert, else remove.
    ///
    /// Returns the post after the update.
    pub async fn toggle_set(
        &self,
        set: PostSet,
        post_id: &str,
        uid: &str,
        add: bool,
    ) -> RepoResult<Post> {
        let (post_field, user_field) = set.fields();
        let op = if add { "+=" } else { "-=" };
        let query = format!(
            "BEGIN TRANSACTION;
             UPDATE post SET {post_field} {op} $uid WHERE post_id = $post_id RETURN AFTER;
             UPDATE user SET {user_field} {op} $post_id WHERE uid = $uid;
             COMMIT TRANSACTION;"
        );

        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("post_id", post_id.to_string()))
            .bind(("uid", uid.to_string()))
            .await?;
        let posts: Vec<Post> = result.take(0)?;
        posts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Post {} not found", post_id)))
    }

    /// Append a comment and bump the counter in one atomic statement
    pub async fn push_comment(&self, post_id: &str, comment: Comment) -> RepoResult<Post> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE post SET comments += $comment, comments_count += 1
                 WHERE post_id = $post_id RETURN AFTER",
            )
            .bind(("post_id", post_id.to_string()))
            .bind(("comment", comment))
            .await?;
        let posts: Vec<Post> = result.take(0)?;
        posts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Post {} not found", post_id)))
    }

    /// Toggle `uid` in an embedded comment's likes; returns the comment
    /// after the toggle.
    ///
    /// SurrealDB has no positional update into embedded arrays, so the
    /// matching element is rebuilt with `array::map` — but entirely inside
    /// one transaction, so a comment appended concurrently is never lost
    /// to a stale write-back.
    pub async fn toggle_comment_like(
        &self,
        post_id: &str,
        comment_id: &str,
        uid: &str,
    ) -> RepoResult<Comment> {
        let map_throw = |err: surrealdb::Error| {
            let msg = err.to_string();
            if msg.contains("post_not_found") {
                RepoError::NotFound(format!("Post {} not found", post_id))
            } else if msg.contains("comment_not_found") {
                RepoError::NotFound(format!(
                    "Comment {} not found on post {}",
                    comment_id, post_id
                ))
            } else {
                RepoError::from(err)
            }
        };

        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 LET $post = (SELECT * FROM post WHERE post_id = $post_id)[0];
                 IF $post = NONE { THROW \"post_not_found\" };
                 LET $target = $post.comments[WHERE comment_id = $comment_id][0];
                 IF $target = NONE { THROW \"comment_not_found\" };
                 LET $likes = IF $uid IN $target.likes
                     { array::filter($target.likes, |$u| $u != $uid) }
                 ELSE
                     { array::append($target.likes, $uid) };
                 LET $updated = {
                     comment_id: $target.comment_id,
                     user_id: $target.user_id,
                     comment: $target.comment,
                     parent_id: $target.parent_id,
                     likes: $likes,
                     created_at: $target.created_at
                 };
                 UPDATE post SET comments = array::map(comments, |$c|
                     IF $c.comment_id = $comment_id { $updated } ELSE { $c })
                     WHERE post_id = $post_id;
                 RETURN $updated;
                 COMMIT TRANSACTION;",
            )
            .bind(("post_id", post_id.to_string()))
            .bind(("comment_id", comment_id.to_string()))
            .bind(("uid", uid.to_string()))
            .await
            .map_err(map_throw)?;
        if let Some(err) = result.take_errors().into_values().next() {
            return Err(map_throw(err));
        }
        // RETURN inside BEGIN/COMMIT collapses the response to one slot
        let toggled: Option<Comment> = result.take(0)?;
        toggled.ok_or_else(|| {
            RepoError::NotFound(format!(
                "Comment {} not found on post {}",
                comment_id, post_id
            ))
        })
    }

    /// Atomic impression bump; returns the new count
    pub async fn increment_impressions(&self, post_id: &str) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("UPDATE post SET impressions += 1 WHERE post_id = $post_id RETURN AFTER")
            .bind(("post_id", post_id.to_string()))
            .await?;
        let posts: Vec<Post> = result.take(0)?;
        posts
            .into_iter()
            .next()
            .map(|p| p.impressions)
            .ok_or_else(|| RepoError::NotFound(format!("Post {} not found", post_id)))
    }

    /// Atomic repost-counter bump; returns the new count
    pub async fn increment_reposts(&self, post_id: &str) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("UPDATE post SET reposts_count += 1 WHERE post_id = $post_id RETURN AFTER")
            .bind(("post_id", post_id.to_string()))
            .await?;
        let posts: Vec<Post> = result.take(0)?;
        posts
            .into_iter()
            .next()
            .map(|p| p.reposts_count)
            .ok_or_else(|| RepoError::NotFound(format!("Post {} not found", post_id)))
    }
}
