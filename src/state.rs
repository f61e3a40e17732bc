use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        auth::AuthService,
        database::Database,
        follow::FollowService,
        mail::MailService,
        message::MessageService,
        notification::NotificationService,
        post::PostService,
        search::SearchService,
        task::TaskService,
        user::UserService,
    },
};

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 数据库连接
    pub db: Arc<Database>,

    /// 认证服务
    pub auth_service: AuthService,

    /// 用户服务
    pub user_service: UserService,

    /// 关注服务
    pub follow_service: FollowService,

    /// 帖子服务
    pub post_service: PostService,

    /// 搜索服务
    pub search_service: SearchService,

    /// 私信服务
    pub message_service: MessageService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 后台任务服务
    pub task_service: TaskService,

    /// 邮件服务
    pub mail_service: MailService,
}

impl AppState {
    /// 检查功能是否启用
    pub fn is_feature_enabled(&self, feature: &str) -> bool {
        match feature {
            "registrations" => self.config.enable_registrations,
            "email_notifications" => self.config.enable_email_notifications,
            _ => false,
        }
    }

    /// 获取分页大小，带上限
    pub fn page_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.config.default_posts_per_page as i64)
            .clamp(1, 100)
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
