use thiserror::Error;

/// 计数存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 该 IP 尚无访问记录
    #[error("visit not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 缓存层错误，`Miss` 与真正的故障区分开
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// 访问服务对外暴露的错误
#[derive(Debug, Error)]
pub enum VisitError {
    #[error("invalid input: ip must not be empty")]
    InvalidInput,

    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl VisitError {
    pub(crate) fn internal(context: &'static str, source: StoreError) -> Self {
        VisitError::Internal { context, source }
    }
}
