use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::User,
    state::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    RequestPartsExt, TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct AuthService {
    config: Config,
}

/// 会话令牌声明
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

/// 密码重置令牌声明，载荷形状与重置邮件中的令牌一致
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub reset_password: String, // 用户ID
    pub exp: i64,
}

impl AuthService {
    pub async fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
        })
    }

    /// 生成密码哈希（加盐，永不存明文）
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// 校验密码，比较委托给哈希库
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }

    /// 签发会话JWT
    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(self.config.jwt_expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("JWT verification failed: {}", e);
                Err(AppError::unauthorized("Invalid token"))
            }
        }
    }

    /// 生成限时密码重置令牌（capability token，不是会话令牌）
    pub fn generate_reset_token(&self, user_id: &str) -> Result<String> {
        let claims = ResetClaims {
            reset_password: user_id.to_string(),
            exp: (Utc::now() + Duration::seconds(self.config.reset_token_expiry_seconds))
                .timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    /// 校验重置令牌。过期或签名不符一律返回 None（fail closed）
    pub fn verify_reset_token(&self, token: &str) -> Option<String> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<ResetClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => Some(token_data.claims.reset_password),
            Err(e) => {
                debug!("Reset token rejected: {}", e);
                None
            }
        }
    }
}

/// 已认证用户提取器。每次成功认证都会刷新 last_seen
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::unauthorized("Missing authorization header"))?;

        let claims = state.auth_service.verify_jwt(bearer.token())?;

        let user = state
            .user_service
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))?;

        state.user_service.touch_last_seen(&user.id).await?;

        Ok(AuthUser(user))
    }
}

/// 可选认证提取器
pub struct OptionalAuthUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(AuthUser(user)) => Ok(OptionalAuthUser(Some(user))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AuthService {
        AuthService::new(&Config::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_password_round_trip() {
        let auth = service().await;
        let hash = auth.hash_password("cat").unwrap();
        assert_ne!(hash, "cat");
        assert!(auth.verify_password("cat", &hash));
        assert!(!auth.verify_password("dog", &hash));
    }

    #[tokio::test]
    async fn test_session_token_round_trip() {
        let auth = service().await;
        let token = auth.issue_token("user-1").unwrap();
        let claims = auth.verify_jwt(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[tokio::test]
    async fn test_reset_token_round_trip() {
        let auth = service().await;
        let token = auth.generate_reset_token("user-1").unwrap();
        assert_eq!(auth.verify_reset_token(&token), Some("user-1".to_string()));
    }

    #[tokio::test]
    async fn test_reset_token_fails_closed() {
        let auth = service().await;
        assert_eq!(auth.verify_reset_token("not-a-token"), None);

        // 过期令牌
        let claims = ResetClaims {
            reset_password: "user-1".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("fallback-key".as_ref()),
        )
        .unwrap();
        assert_eq!(auth.verify_reset_token(&expired), None);

        // 签名不符
        let claims = ResetClaims {
            reset_password: "user-1".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("other-key".as_ref()),
        )
        .unwrap();
        assert_eq!(auth.verify_reset_token(&forged), None);
    }
}
