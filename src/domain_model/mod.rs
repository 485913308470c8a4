mod device;
mod member;
mod token;

pub use device::*;
pub use member::*;
pub use token::*;
