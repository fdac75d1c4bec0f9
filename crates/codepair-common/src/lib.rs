pub mod errors;
pub mod id;

pub use errors::CodepairError;
pub use id::{new_id, ConnectionId};

pub type Result<T> = std::result::Result<T, CodepairError>;
