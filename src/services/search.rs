use crate::{
    error::{AppError, Result},
    models::post::Post,
    services::{Database, PaginatedResult},
};
use std::sync::Arc;
use tracing::{debug, info};

/// 帖子全文搜索。索引表由写入方显式同步，
/// 不依赖任何隐式的提交事件监听
#[derive(Clone)]
pub struct SearchService {
    db: Arc<Database>,
}

impl SearchService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 写入后钩子：PostService 每插入一条帖子就调用一次
    pub async fn index_post(&self, post: &Post) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO post_index (post_id, body) VALUES (?, ?)")
            .bind(&post.id)
            .bind(&post.body)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn search(&self, query: &str, page: i64, limit: i64) -> Result<PaginatedResult<Post>> {
        let query = query.trim();
        if query.chars().count() < self.db.config.search_min_length {
            return Err(AppError::Validation(format!(
                "Search query must be at least {} characters",
                self.db.config.search_min_length
            )));
        }

        debug!("Searching posts for: {}", query);
        let pattern = format!("%{}%", query);
        let offset = (page - 1) * limit;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM post_index WHERE body LIKE ?",
        )
        .bind(&pattern)
        .fetch_one(self.db.pool())
        .await?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.*
            FROM post p
            JOIN post_index i ON i.post_id = p.id
            WHERE i.body LIKE ?
            ORDER BY p.timestamp DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(PaginatedResult::new(posts, total, page, limit))
    }

    /// 从帖子表重建整个索引
    pub async fn reindex(&self) -> Result<i64> {
        sqlx::query("DELETE FROM post_index")
            .execute(self.db.pool())
            .await?;

        let result = sqlx::query("INSERT INTO post_index (post_id, body) SELECT id, body FROM post")
            .execute(self.db.pool())
            .await?;

        let indexed = result.rows_affected() as i64;
        info!("Reindexed {} posts", indexed);
        Ok(indexed)
    }
}
