use rainbow_microblog::{
    config::Config,
    models::user::User,
    services::{
        AuthService, Database, FollowService, LocalJobQueue, MailService, MessageService,
        NotificationService, PostService, SearchService, TaskService, UserService,
    },
};
use std::sync::Arc;

/// 测试用的服务集合，全部跑在内存 SQLite 上
pub struct TestApp {
    pub db: Arc<Database>,
    pub auth: AuthService,
    pub users: UserService,
    pub follows: FollowService,
    pub posts: PostService,
    pub search: SearchService,
    pub messages: MessageService,
    pub notifications: NotificationService,
    pub tasks: TaskService,
}

pub async fn spawn_app() -> TestApp {
    let config = Config::default();
    let db = Arc::new(Database::new(&config).await.expect("database setup failed"));

    let auth = AuthService::new(&config).await.unwrap();
    let users = UserService::new(db.clone()).await.unwrap();
    let follows = FollowService::new(db.clone()).await.unwrap();
    let search = SearchService::new(db.clone()).await.unwrap();
    let posts = PostService::new(db.clone(), search.clone()).await.unwrap();
    let notifications = NotificationService::new(db.clone()).await.unwrap();
    let messages = MessageService::new(db.clone(), users.clone(), notifications.clone())
        .await
        .unwrap();
    let mail = MailService::new(&config).await.unwrap();
    let queue = Arc::new(LocalJobQueue::new(
        db.clone(),
        mail,
        notifications.clone(),
    ));
    let tasks = TaskService::new(db.clone(), queue).await.unwrap();

    TestApp {
        db,
        auth,
        users,
        follows,
        posts,
        search,
        messages,
        notifications,
        tasks,
    }
}

pub async fn register_user(app: &TestApp, username: &str) -> User {
    let hash = app.auth.hash_password("correct-horse-battery").unwrap();
    app.users
        .create_user(username, &format!("{}@example.com", username), &hash)
        .await
        .unwrap()
}
