pub mod link_cache;
pub mod macros;
pub mod register;
pub mod store;
pub mod token;
pub mod traits;

pub use link_cache::LinkCache;
pub use store::{MemoryTokenStore, RedisTokenStore};
pub use token::derive_token;
pub use traits::{CachedLink, TokenStore};
