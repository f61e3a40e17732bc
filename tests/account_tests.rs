mod common;

use common::{register_user, spawn_app};
use rainbow_microblog::{error::AppError, models::user::UpdateProfileRequest};

#[tokio::test]
async fn test_register_and_login_round_trip() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    let fetched = app
        .users
        .get_by_username("john")
        .await
        .unwrap()
        .expect("user not found");
    assert_eq!(fetched.id, john.id);
    assert_eq!(fetched.email, "john@example.com");

    // 登录路径：查用户 + 校验密码 + 签发令牌
    assert!(app
        .auth
        .verify_password("correct-horse-battery", &fetched.password_hash));
    assert!(!app.auth.verify_password("wrong-password", &fetched.password_hash));

    let token = app.auth.issue_token(&fetched.id).unwrap();
    let claims = app.auth.verify_jwt(&token).unwrap();
    assert_eq!(claims.sub, fetched.id);
}

#[tokio::test]
async fn test_duplicate_username_and_email_are_rejected() {
    let app = spawn_app().await;
    register_user(&app, "john").await;

    let hash = app.auth.hash_password("password").unwrap();

    let result = app
        .users
        .create_user("john", "other@example.com", &hash)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = app
        .users
        .create_user("johnny", "john@example.com", &hash)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_invalid_usernames_are_rejected() {
    let app = spawn_app().await;
    let hash = app.auth.hash_password("password").unwrap();

    for bad in ["ab", "has space", "semi;colon", ""] {
        let result = app
            .users
            .create_user(bad, &format!("{}@example.com", bad.len()), &hash)
            .await;
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "username '{}' should be rejected",
            bad
        );
    }
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let app = spawn_app().await;
    let hash = app.auth.hash_password("password").unwrap();

    let result = app.users.create_user("john", "not-an-email", &hash).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_profile_update() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    register_user(&app, "susan").await;

    let updated = app
        .users
        .update_profile(
            &john,
            &UpdateProfileRequest {
                username: Some("john_doe".to_string()),
                about_me: Some("Hello, world".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "john_doe");
    assert_eq!(updated.about_me.as_deref(), Some("Hello, world"));

    // 改名撞上已存在的用户名
    let result = app
        .users
        .update_profile(
            &updated,
            &UpdateProfileRequest {
                username: Some("susan".to_string()),
                about_me: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // 只改 about_me 时用户名保持不变
    let updated = app
        .users
        .update_profile(
            &updated,
            &UpdateProfileRequest {
                username: None,
                about_me: Some("New bio".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "john_doe");
    assert_eq!(updated.about_me.as_deref(), Some("New bio"));

    // 超长简介被拒绝
    let result = app
        .users
        .update_profile(
            &updated,
            &UpdateProfileRequest {
                username: None,
                about_me: Some("x".repeat(141)),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // 空串清除简介
    let updated = app
        .users
        .update_profile(
            &updated,
            &UpdateProfileRequest {
                username: None,
                about_me: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.about_me, None);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    let token = app.auth.generate_reset_token(&john.id).unwrap();
    let user_id = app
        .auth
        .verify_reset_token(&token)
        .expect("reset token should verify");
    assert_eq!(user_id, john.id);

    let new_hash = app.auth.hash_password("brand-new-password").unwrap();
    app.users.set_password_hash(&user_id, &new_hash).await.unwrap();

    let john = app.users.get_by_id(&john.id).await.unwrap().unwrap();
    assert!(app.auth.verify_password("brand-new-password", &john.password_hash));
    assert!(!app.auth.verify_password("correct-horse-battery", &john.password_hash));

    // 会话令牌不能当重置令牌用
    let session = app.auth.issue_token(&john.id).unwrap();
    assert_eq!(app.auth.verify_reset_token(&session), None);
}

#[tokio::test]
async fn test_post_length_is_validated() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    let result = app.posts.create_post(&john.id, "  ").await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let long = "y".repeat(141);
    let result = app.posts.create_post(&john.id, &long).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // 正好 140 个字符是允许的
    let exact = "z".repeat(140);
    let post = app.posts.create_post(&john.id, &exact).await.unwrap();
    assert_eq!(post.body.chars().count(), 140);
}

#[tokio::test]
async fn test_mark_messages_read_moves_watermark() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    assert!(john.last_message_read_time.is_none());

    app.users.mark_messages_read(&john.id).await.unwrap();

    let john = app.users.get_by_id(&john.id).await.unwrap().unwrap();
    assert!(john.last_message_read_time.is_some());
}
