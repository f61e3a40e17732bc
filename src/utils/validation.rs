use crate::error::{AppError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// 验证用户名格式：3-30个字符，字母数字和下划线
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }

    static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
    let pattern = USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").unwrap());

    if !pattern.is_match(username) {
        return Err(AppError::Validation(
            "Username must be 3-30 characters of letters, digits or underscores".to_string(),
        ));
    }

    Ok(())
}

/// 邮箱格式验证
pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email cannot be empty".to_string()));
    }

    if !validator::validate_email(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    if email.len() > 254 {
        return Err(AppError::Validation("Email address is too long".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("susan").is_ok());
        assert!(validate_username("john_doe99").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_email_format() {
        assert!(validate_email_format("john@example.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("not-an-email").is_err());
    }
}
