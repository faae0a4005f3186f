pub mod auth_service;
pub mod feed_service;
pub mod group_service;
pub mod post_service;
