use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::errors::{CacheError, StoreError};

/// 单个 IP 的持久化访问计数
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Visit {
    pub id: i64,
    pub ip: String,
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 访问计数的持久化存储
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// IP 不存在时以 count = 1 创建，否则原子地加一并刷新 updated_at
    async fn increment_visit(&self, ip: &str) -> Result<(), StoreError>;

    /// IP 不存在时返回 `StoreError::NotFound`
    async fn get_visit_count(&self, ip: &str) -> Result<i64, StoreError>;

    /// 按 count 降序、updated_at 降序返回全部记录
    async fn get_all_visits(&self) -> Result<Vec<Visit>, StoreError>;
}

/// 带过期时间的键值缓存
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 键不存在或已过期时返回 `CacheError::Miss`
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 删除不存在的键不算错误
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn increment(&self, key: &str) -> Result<i64, CacheError>;
}
