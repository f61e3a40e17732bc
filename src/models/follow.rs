use serde::{Deserialize, Serialize};

/// 用户主页展示的关注统计
#[derive(Debug, Serialize, Deserialize)]
pub struct FollowStats {
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
    pub is_followed_by: bool,
}
