pub mod user;
pub mod follow;
pub mod post;
pub mod message;
pub mod notification;
pub mod task;
