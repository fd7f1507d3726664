mod friend_request;
mod user;

pub use friend_request::*;
pub use user::*;
