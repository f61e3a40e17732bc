use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,

    // Authentication configuration
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub reset_token_expiry_seconds: i64,

    // Email configuration
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_name: String,
    pub smtp_from_email: String,

    // Frontend URLs
    pub frontend_url: String,
    pub password_reset_url: String,

    // Content settings
    pub max_post_length: usize,
    pub max_message_length: usize,
    pub max_about_me_length: usize,
    pub default_posts_per_page: usize,

    // Feature flags
    pub enable_registrations: bool,
    pub enable_email_notifications: bool,

    // Search configuration
    pub search_min_length: usize,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://microblog.db".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "fallback-key".to_string()),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()?,
            reset_token_expiry_seconds: env::var("RESET_TOKEN_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()?,

            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Rainbow Microblog".to_string()),
            smtp_from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@rainbow-microblog.com".to_string()),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            password_reset_url: env::var("PASSWORD_RESET_URL")
                .unwrap_or_else(|_| "http://localhost:3001/reset-password".to_string()),

            max_post_length: env::var("MAX_POST_LENGTH")
                .unwrap_or_else(|_| "140".to_string())
                .parse()?,
            max_message_length: env::var("MAX_MESSAGE_LENGTH")
                .unwrap_or_else(|_| "140".to_string())
                .parse()?,
            max_about_me_length: env::var("MAX_ABOUT_ME_LENGTH")
                .unwrap_or_else(|_| "140".to_string())
                .parse()?,
            default_posts_per_page: env::var("DEFAULT_POSTS_PER_PAGE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,

            enable_registrations: env::var("ENABLE_REGISTRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
            enable_email_notifications: env::var("ENABLE_EMAIL_NOTIFICATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,

            search_min_length: env::var("SEARCH_MIN_LENGTH")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    /// 测试用默认配置：内存数据库，不配置SMTP
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "fallback-key".to_string(),
            jwt_expiry_hours: 168,
            reset_token_expiry_seconds: 600,
            smtp_host: String::new(),
            smtp_port: 25,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from_name: "Rainbow Microblog".to_string(),
            smtp_from_email: "noreply@rainbow-microblog.com".to_string(),
            frontend_url: "http://localhost:3001".to_string(),
            password_reset_url: "http://localhost:3001/reset-password".to_string(),
            max_post_length: 140,
            max_message_length: 140,
            max_about_me_length: 140,
            default_posts_per_page: 20,
            enable_registrations: true,
            enable_email_notifications: true,
            search_min_length: 2,
            cors_allowed_origins: "http://localhost:3001".to_string(),
        }
    }
}
