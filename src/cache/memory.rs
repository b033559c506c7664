use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use crate::domain::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// 进程内缓存，过期时间基于 `tokio::time::Instant`，测试中可以暂停和推进时钟
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CachedValue>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的键数量
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, v| v.is_expired(now));
        Err(CacheError::Miss)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    /// 与 Redis INCR 一致：不存在（或已过期）的键从 0 开始且不带过期时间，
    /// 非整数值或溢出时返回错误且不修改原值，原有过期时间保持不变
    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let current: i64 = occupied.get().value.parse().map_err(|_| {
                    CacheError::Unavailable(format!("value at {} is not an integer", key))
                })?;
                let next = current.checked_add(1).ok_or_else(|| {
                    CacheError::Unavailable(format!("increment would overflow at {}", key))
                })?;
                occupied.get_mut().value = next.to_string();
                Ok(next)
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(CachedValue {
                    value: "1".to_string(),
                    expires_at: None,
                });
                Ok(1)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CachedValue {
                    value: "1".to_string(),
                    expires_at: None,
                });
                Ok(1)
            }
        }
    }
}
