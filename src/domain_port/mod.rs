// store

mod refresh_token_store;
mod token_blacklist;

pub use refresh_token_store::*;
pub use token_blacklist::*;

// repo

mod member_repo;

pub use member_repo::*;
