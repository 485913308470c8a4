mod auth_service;
mod member_service;

pub use auth_service::*;
pub use member_service::*;
