use crate::{
    error::{AppError, Result},
    models::post::Post,
    models::task::Task,
    models::user::User,
    services::{Database, MailService, NotificationService},
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// 后台任务队列。注入给 TaskService，生产与测试可以替换实现
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队一个任务并返回队列分配的 job id
    async fn enqueue(&self, name: &str, user_id: &str) -> Result<String>;
}

/// 任务簿记。记录本身与任务执行解耦：
/// 请求在写入记录后立即返回，complete 由 worker 置位
#[derive(Clone)]
pub struct TaskService {
    db: Arc<Database>,
    queue: Arc<dyn JobQueue>,
}

impl TaskService {
    pub async fn new(db: Arc<Database>, queue: Arc<dyn JobQueue>) -> Result<Self> {
        Ok(Self { db, queue })
    }

    /// 同名未完成任务，每个用户最多一个
    pub async fn get_task_in_progress(&self, user_id: &str, name: &str) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT * FROM task WHERE user_id = ? AND name = ? AND complete = 0 LIMIT 1",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(task)
    }

    /// 入队任务并写入簿记记录，id 即队列返回的 job id
    pub async fn launch_task(&self, user_id: &str, name: &str, description: &str) -> Result<Task> {
        if self.get_task_in_progress(user_id, name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A '{}' task is already in progress",
                name
            )));
        }

        let job_id = self.queue.enqueue(name, user_id).await?;

        let task = Task {
            id: job_id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            complete: false,
        };

        sqlx::query(
            "INSERT INTO task (id, user_id, name, description, complete) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.user_id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.complete)
        .execute(self.db.pool())
        .await?;

        info!("Launched task '{}' ({}) for user {}", name, task.id, user_id);
        Ok(task)
    }

    pub async fn tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>("SELECT * FROM task WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(tasks)
    }
}

/// 进程内任务队列：用 tokio 任务执行 worker。
/// 对外的契约与外部队列一致：enqueue 返回 job id，worker 负责置位 complete
pub struct LocalJobQueue {
    db: Arc<Database>,
    mail_service: MailService,
    notification_service: NotificationService,
}

impl LocalJobQueue {
    pub fn new(
        db: Arc<Database>,
        mail_service: MailService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            db,
            mail_service,
            notification_service,
        }
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn enqueue(&self, name: &str, user_id: &str) -> Result<String> {
        if name != "export_posts" {
            return Err(AppError::BadRequest(format!("Unknown task '{}'", name)));
        }

        let job_id = Uuid::new_v4().to_string();
        let db = self.db.clone();
        let mail = self.mail_service.clone();
        let notifications = self.notification_service.clone();
        let worker_job_id = job_id.clone();
        let worker_user_id = user_id.to_string();

        tokio::spawn(async move {
            if let Err(e) =
                run_export_posts(db, mail, notifications, &worker_job_id, &worker_user_id).await
            {
                warn!("Export task {} failed: {}", worker_job_id, e);
            }
        });

        Ok(job_id)
    }
}

/// 导出 worker：收集用户帖子、邮寄归档、置位 complete。
/// 进度通过 task_progress 通知发布
async fn run_export_posts(
    db: Arc<Database>,
    mail: MailService,
    notifications: NotificationService,
    job_id: &str,
    user_id: &str,
) -> Result<()> {
    // 簿记记录在 enqueue 返回之后才插入，先等它出现
    let mut recorded = false;
    for _ in 0..40 {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task WHERE id = ?")
            .bind(job_id)
            .fetch_one(db.pool())
            .await?;
        if count > 0 {
            recorded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if !recorded {
        return Err(AppError::Internal(format!(
            "Task record {} never appeared",
            job_id
        )));
    }

    notifications
        .add_notification(user_id, "task_progress", json!({"task_id": job_id, "progress": 0}))
        .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let posts = sqlx::query_as::<_, Post>(
        "SELECT * FROM post WHERE author_id = ? ORDER BY timestamp ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    let archive: Vec<serde_json::Value> = posts
        .iter()
        .map(|p| json!({"body": p.body, "timestamp": p.timestamp.to_rfc3339()}))
        .collect();
    let archive_json = serde_json::to_string_pretty(&json!(archive))?;

    mail.send_export_email(&user, archive_json);

    sqlx::query("UPDATE task SET complete = 1 WHERE id = ?")
        .bind(job_id)
        .execute(db.pool())
        .await?;

    notifications
        .add_notification(user_id, "task_progress", json!({"task_id": job_id, "progress": 100}))
        .await?;

    info!("Export task {} finished for user {}", job_id, user_id);
    Ok(())
}
