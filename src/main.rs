use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, Router},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rainbow_microblog::{
    config::Config,
    routes,
    services::{
        AuthService, Database, FollowService, LocalJobQueue, MailService, MessageService,
        NotificationService, PostService, SearchService, TaskService, UserService,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "rainbow_microblog=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rainbow-Microblog service...");

    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化数据库连接并应用表结构
    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    // 初始化所有服务
    let auth_service = AuthService::new(&config).await?;
    let user_service = UserService::new(db.clone()).await?;
    let follow_service = FollowService::new(db.clone()).await?;
    let search_service = SearchService::new(db.clone()).await?;
    let post_service = PostService::new(db.clone(), search_service.clone()).await?;
    let notification_service = NotificationService::new(db.clone()).await?;
    let message_service = MessageService::new(
        db.clone(),
        user_service.clone(),
        notification_service.clone(),
    )
    .await?;
    let mail_service = MailService::new(&config).await?;
    let job_queue = Arc::new(LocalJobQueue::new(
        db.clone(),
        mail_service.clone(),
        notification_service.clone(),
    ));
    let task_service = TaskService::new(db.clone(), job_queue).await?;

    // 创建应用状态
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth_service,
        user_service,
        follow_service,
        post_service,
        search_service,
        message_service,
        notification_service,
        task_service,
        mail_service,
    });

    // 配置 CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect::<Vec<_>>(),
        );

    // 构建应用路由
    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth::router())
        .nest("/api/users", routes::users::router())
        .nest("/api/follows", routes::follows::router())
        .nest("/api/posts", routes::posts::router())
        .nest("/api/messages", routes::messages::router())
        .nest("/api/notifications", routes::notifications::router())
        .nest("/api/tasks", routes::tasks::router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // 启动主服务器
    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Rainbow-Microblog is running!"
}
