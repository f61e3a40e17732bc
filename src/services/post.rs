use crate::{
    error::{AppError, Result},
    models::post::Post,
    services::{Database, PaginatedResult, SearchService},
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
    search_service: SearchService,
}

impl PostService {
    pub async fn new(db: Arc<Database>, search_service: SearchService) -> Result<Self> {
        Ok(Self { db, search_service })
    }

    /// 发布帖子：检测语言、插入、随后显式同步搜索索引
    pub async fn create_post(&self, author_id: &str, body: &str) -> Result<Post> {
        let body = body.trim();
        if body.is_empty() || body.chars().count() > self.db.config.max_post_length {
            return Err(AppError::Validation(format!(
                "Post body must be between 1 and {} characters",
                self.db.config.max_post_length
            )));
        }

        let post = Post::new(author_id.to_string(), body.to_string(), detect_language(body));

        sqlx::query(
            "INSERT INTO post (id, body, author_id, timestamp, language) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.body)
        .bind(&post.author_id)
        .bind(post.timestamp)
        .bind(&post.language)
        .execute(self.db.pool())
        .await?;

        self.search_service.index_post(&post).await?;

        info!("User {} published post {}", author_id, post.id);
        Ok(post)
    }

    /// 关注流：自己的帖子 ∪ 关注对象的帖子，按时间倒序，
    /// 时间相同按 id 倒序保证分页顺序稳定
    pub async fn followed_posts(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<PaginatedResult<Post>> {
        debug!("Building followed feed for user: {}", user_id);
        let offset = (page - 1) * limit;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM post
            WHERE author_id = ?1
               OR author_id IN (SELECT followed_id FROM follow WHERE follower_id = ?1)
            "#,
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM post
            WHERE author_id = ?1
               OR author_id IN (SELECT followed_id FROM follow WHERE follower_id = ?1)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(PaginatedResult::new(posts, total, page, limit))
    }

    /// 所有用户的帖子，按时间倒序
    pub async fn explore(&self, page: i64, limit: i64) -> Result<PaginatedResult<Post>> {
        let offset = (page - 1) * limit;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post")
            .fetch_one(self.db.pool())
            .await?;

        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM post ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(PaginatedResult::new(posts, total, page, limit))
    }

    /// 某用户的个人时间线
    pub async fn user_posts(
        &self,
        author_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<PaginatedResult<Post>> {
        let offset = (page - 1) * limit;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(self.db.pool())
            .await?;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM post
            WHERE author_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(PaginatedResult::new(posts, total, page, limit))
    }
}

/// 帖子语言检测。检测不可用或不确定时返回空串
#[cfg(feature = "lang-detect")]
fn detect_language(body: &str) -> String {
    whatlang::detect(body)
        .map(|info| info.lang().code().to_string())
        .unwrap_or_default()
}

#[cfg(not(feature = "lang-detect"))]
fn detect_language(_body: &str) -> String {
    String::new()
}
