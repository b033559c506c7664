use std::sync::Arc;
use std::time::Duration;

use crate::cache::visit_count_key;
use crate::domain::{CacheError, CacheStore, StoreError, Visit, VisitError, VisitStore};

/// 访问计数的默认缓存时间
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// 访问计数服务
///
/// 数据库是唯一的数据来源，缓存只是读路径上的加速层：读取时未命中则回源并回填，
/// 写入成功后删除缓存。缓存的任何错误都不会让请求失败。
///
/// 写入与删缓存之间的并发读可能把旧值写回缓存，这个旧值最多保留到 TTL 过期
/// 或下一次写入。
#[derive(Clone)]
pub struct VisitService {
    store: Arc<dyn VisitStore>,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
}

impl VisitService {
    pub fn new(store: Arc<dyn VisitStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, cache, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(
        store: Arc<dyn VisitStore>,
        cache: Arc<dyn CacheStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    /// 记录一次访问
    pub async fn record_ping(&self, ip: &str) -> Result<(), VisitError> {
        if ip.is_empty() {
            return Err(VisitError::InvalidInput);
        }

        self.store
            .increment_visit(ip)
            .await
            .map_err(|e| VisitError::internal("failed to record visit", e))?;

        // 删除失败时旧值会在 TTL 内过期，不影响本次写入结果
        let key = visit_count_key(ip);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(ip, error = %e, "Failed to invalidate cached visit count");
        }

        Ok(())
    }

    /// 读取访问次数，从未访问过的 IP 返回 0
    pub async fn get_visit_count(&self, ip: &str) -> Result<i64, VisitError> {
        if ip.is_empty() {
            return Err(VisitError::InvalidInput);
        }

        let key = visit_count_key(ip);
        match self.cache.get(&key).await {
            Ok(cached) => match cached.parse::<i64>() {
                Ok(count) => return Ok(count),
                Err(_) => {
                    tracing::warn!(ip, value = %cached, "Ignoring unparsable cached visit count");
                }
            },
            Err(CacheError::Miss) => {}
            Err(e) => {
                tracing::warn!(ip, error = %e, "Cache read failed, falling back to store");
            }
        }

        let count = match self.store.get_visit_count(ip).await {
            Ok(count) => count,
            Err(StoreError::NotFound) => return Ok(0),
            Err(e) => return Err(VisitError::internal("failed to get visit count", e)),
        };

        if let Err(e) = self
            .cache
            .set(&key, &count.to_string(), self.cache_ttl)
            .await
        {
            tracing::warn!(ip, error = %e, "Failed to cache visit count");
        }

        Ok(count)
    }

    /// 全部访问记录，不走缓存
    pub async fn get_all_visits(&self) -> Result<Vec<Visit>, VisitError> {
        self.store
            .get_all_visits()
            .await
            .map_err(|e| VisitError::internal("failed to get all visits", e))
    }
}
