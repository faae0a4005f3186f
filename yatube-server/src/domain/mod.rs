pub mod actor;
pub mod error;
pub mod group;
pub mod pagination;
pub mod post;
pub mod user;
