use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};

use crate::config::RedisConfig;
use crate::domain::{CacheError, CacheStore};

/// 基于 Redis 的缓存实现
///
/// `ConnectionManager` 内部是一条多路复用连接，断线后自动重连。
#[derive(Clone)]
pub struct RedisCacheRepository {
    conn: ConnectionManager,
}

impl RedisCacheRepository {
    /// 建立连接并用 PING 校验可用性
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.connection_info()?)?;
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.max_retries)
            .set_connection_timeout(config.connect_timeout)
            .set_response_timeout(config.response_timeout);

        let mut conn = ConnectionManager::new_with_config(client, manager_config).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(Self { conn })
    }
}

/// SETEX 只接受整秒且必须大于 0
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCacheRepository {
    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        value.ok_or(CacheError::Miss)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(key).await?;
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_rounded_down_to_whole_seconds_with_floor_of_one() {
        assert_eq!(ttl_secs(Duration::from_secs(300)), 300);
        assert_eq!(ttl_secs(Duration::from_millis(1500)), 1);
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::ZERO), 1);
    }
}
