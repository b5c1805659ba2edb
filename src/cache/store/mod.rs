pub mod memory;
pub mod redis;

pub use memory::MemoryTokenStore;
pub use redis::RedisTokenStore;
