pub mod database;
pub mod auth;
pub mod user;
pub mod follow;
pub mod post;
pub mod search;
pub mod message;
pub mod notification;
pub mod task;
pub mod mail;

// 重新导出常用类型
pub use database::{Database, PaginatedResult};
pub use auth::AuthService;
pub use user::UserService;
pub use follow::FollowService;
pub use post::PostService;
pub use search::SearchService;
pub use message::MessageService;
pub use notification::NotificationService;
pub use task::{JobQueue, LocalJobQueue, TaskService};
pub use mail::MailService;
