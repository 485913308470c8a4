mod auth_service_impl;
mod member_service_impl;
mod token_codec;

pub use auth_service_impl::*;
pub use member_service_impl::*;
pub use token_codec::*;
