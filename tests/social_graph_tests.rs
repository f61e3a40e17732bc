mod common;

use common::{register_user, spawn_app};
use rainbow_microblog::error::AppError;

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    let result = app.follows.follow(&john.id, &john.id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(!app.follows.is_following(&john.id, &john.id).await.unwrap());

    let result = app.follows.unfollow(&john.id, &john.id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_follow_unfollow_round_trip() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    let susan = register_user(&app, "susan").await;

    assert!(!app.follows.is_following(&john.id, &susan.id).await.unwrap());

    app.follows.follow(&john.id, &susan.id).await.unwrap();
    assert!(app.follows.is_following(&john.id, &susan.id).await.unwrap());
    assert!(!app.follows.is_following(&susan.id, &john.id).await.unwrap());
    assert_eq!(app.follows.follower_count(&susan.id).await.unwrap(), 1);
    assert_eq!(app.follows.following_count(&john.id).await.unwrap(), 1);

    app.follows.unfollow(&john.id, &susan.id).await.unwrap();
    assert!(!app.follows.is_following(&john.id, &susan.id).await.unwrap());
    assert_eq!(app.follows.follower_count(&susan.id).await.unwrap(), 0);
    assert_eq!(app.follows.following_count(&john.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_follow_is_idempotent() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    let susan = register_user(&app, "susan").await;

    app.follows.follow(&john.id, &susan.id).await.unwrap();
    app.follows.follow(&john.id, &susan.id).await.unwrap();

    assert_eq!(app.follows.follower_count(&susan.id).await.unwrap(), 1);

    // 删除不存在的边也是 no-op
    app.follows.unfollow(&john.id, &susan.id).await.unwrap();
    app.follows.unfollow(&john.id, &susan.id).await.unwrap();
    assert_eq!(app.follows.follower_count(&susan.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_follower_listings() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    let susan = register_user(&app, "susan").await;
    let mary = register_user(&app, "mary").await;

    app.follows.follow(&john.id, &susan.id).await.unwrap();
    app.follows.follow(&mary.id, &susan.id).await.unwrap();
    app.follows.follow(&susan.id, &john.id).await.unwrap();

    let followers = app.follows.followers(&susan.id, 1, 10).await.unwrap();
    let mut names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["john", "mary"]);

    let following = app.follows.following(&susan.id, 1, 10).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "john");

    let stats = app
        .follows
        .follow_stats(&susan.id, Some(&john.id))
        .await
        .unwrap();
    assert_eq!(stats.followers_count, 2);
    assert_eq!(stats.following_count, 1);
    assert!(stats.is_following);
    assert!(stats.is_followed_by);
}

#[tokio::test]
async fn test_followed_posts_union_and_order() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    let susan = register_user(&app, "susan").await;
    let mary = register_user(&app, "mary").await;

    app.follows.follow(&john.id, &susan.id).await.unwrap();

    let post_a = app.posts.create_post(&john.id, "post from john").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let post_b = app.posts.create_post(&susan.id, "post from susan").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.posts.create_post(&mary.id, "post from mary").await.unwrap();

    // john 的流：susan 的新帖在前，自己的帖子在后，mary 不在其中
    let feed = app.posts.followed_posts(&john.id, 1, 10).await.unwrap();
    let ids: Vec<&str> = feed.data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![post_b.id.as_str(), post_a.id.as_str()]);
    assert_eq!(feed.total, 2);

    // susan 不关注任何人，只看到自己的帖子
    let feed = app.posts.followed_posts(&susan.id, 1, 10).await.unwrap();
    assert_eq!(feed.data.len(), 1);
    assert_eq!(feed.data[0].id, post_b.id);

    // 取关后 susan 的帖子从 john 的流里消失
    app.follows.unfollow(&john.id, &susan.id).await.unwrap();
    let feed = app.posts.followed_posts(&john.id, 1, 10).await.unwrap();
    let ids: Vec<&str> = feed.data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![post_a.id.as_str()]);
}

#[tokio::test]
async fn test_feed_pagination() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    for i in 0..3 {
        app.posts
            .create_post(&john.id, &format!("post {}", i))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let page1 = app.posts.followed_posts(&john.id, 1, 2).await.unwrap();
    assert_eq!(page1.data.len(), 2);
    assert_eq!(page1.total, 3);
    assert_eq!(page1.total_pages, 2);
    assert_eq!(page1.data[0].body, "post 2");
    assert_eq!(page1.data[1].body, "post 1");

    let page2 = app.posts.followed_posts(&john.id, 2, 2).await.unwrap();
    assert_eq!(page2.data.len(), 1);
    assert_eq!(page2.data[0].body, "post 0");
}

#[tokio::test]
async fn test_equal_timestamps_break_ties_by_id() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    // 人为制造时间完全相同的两条帖子
    let now = chrono::Utc::now();
    for id in ["aaaa", "bbbb"] {
        sqlx::query("INSERT INTO post (id, body, author_id, timestamp, language) VALUES (?, ?, ?, ?, '')")
            .bind(id)
            .bind(format!("tied {}", id))
            .bind(&john.id)
            .bind(now)
            .execute(app.db.pool())
            .await
            .unwrap();
    }

    let feed = app.posts.followed_posts(&john.id, 1, 10).await.unwrap();
    let ids: Vec<&str> = feed.data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["bbbb", "aaaa"]);

    // 同样的顺序必须在重复查询中保持稳定
    let again = app.posts.followed_posts(&john.id, 1, 10).await.unwrap();
    let ids_again: Vec<&str> = again.data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ids_again);
}

#[tokio::test]
async fn test_explore_and_user_posts() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;
    let susan = register_user(&app, "susan").await;

    app.posts.create_post(&john.id, "from john").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.posts.create_post(&susan.id, "from susan").await.unwrap();

    let explore = app.posts.explore(1, 10).await.unwrap();
    assert_eq!(explore.total, 2);
    assert_eq!(explore.data[0].body, "from susan");

    let johns = app.posts.user_posts(&john.id, 1, 10).await.unwrap();
    assert_eq!(johns.total, 1);
    assert_eq!(johns.data[0].body, "from john");
}

#[tokio::test]
async fn test_search_indexes_on_write() {
    let app = spawn_app().await;
    let john = register_user(&app, "john").await;

    app.posts
        .create_post(&john.id, "the quick brown fox")
        .await
        .unwrap();
    app.posts.create_post(&john.id, "lazy dog").await.unwrap();

    let hits = app.search.search("quick", 1, 10).await.unwrap();
    assert_eq!(hits.total, 1);
    assert_eq!(hits.data[0].body, "the quick brown fox");

    // 过短的查询被拒绝，长度按字符数而不是字节数
    assert!(matches!(
        app.search.search("q", 1, 10).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        app.search.search("搜", 1, 10).await,
        Err(AppError::Validation(_))
    ));

    // 重建索引后结果不变
    let indexed = app.search.reindex().await.unwrap();
    assert_eq!(indexed, 2);
    let hits = app.search.search("lazy", 1, 10).await.unwrap();
    assert_eq!(hits.total, 1);
}
