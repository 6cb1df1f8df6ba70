pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use self::memory::MemoryStore;
pub use self::postgres::{create_pool, PgStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use self::store::{CatalogStore, SwipeStore};
