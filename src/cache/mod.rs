// 缓存模块
// 包含缓存键生成以及 Redis / 进程内两种实现

pub mod keys;
pub mod memory;
pub mod redis_cache;

pub use keys::visit_count_key;
pub use memory::MemoryCache;
pub use redis_cache::RedisCacheRepository;
