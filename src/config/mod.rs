use std::env;
use std::str::FromStr;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo, RedisResult};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::utils::parse_duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    /// 访问计数缓存的过期时间
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 读取请求体的超时时间
    pub read_timeout: Duration,
    /// 整个请求的处理时限，超时后请求被取消
    pub write_timeout: Duration,
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 设置了 DATABASE_URL 时优先使用，忽略下面的分项配置
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub max_conn_lifetime: Duration,
    pub max_conn_idle_time: Duration,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// 设置了 REDIS_URL 时优先使用
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: String,
    pub db: i64,
    pub max_retries: usize,
    pub connect_timeout: Duration,
    pub response_timeout: Duration,
}

impl Config {
    /// 先加载 .env，再从环境变量读取配置
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，缺失或无法解析的值使用默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Config {
            server: ServerConfig {
                host: vars.string("SERVER_HOST", "0.0.0.0"),
                port: vars.parse("SERVER_PORT", 5000),
                read_timeout: vars.duration("SERVER_READ_TIMEOUT", Duration::from_secs(10)),
                write_timeout: vars.duration("SERVER_WRITE_TIMEOUT", Duration::from_secs(10)),
                shutdown_timeout: vars.duration("SERVER_SHUTDOWN_TIMEOUT", Duration::from_secs(30)),
            },
            database: DatabaseConfig {
                url: vars.optional("DATABASE_URL"),
                host: vars.string("DB_HOST", "localhost"),
                port: vars.parse("DB_PORT", 5432),
                user: vars.string("DB_USER", "user"),
                password: vars.string("DB_PASSWORD", "password"),
                name: vars.string("DB_NAME", "pingdb"),
                ssl_mode: vars.string("DB_SSLMODE", "disable"),
                max_conns: vars.parse("DB_MAX_CONNS", 25),
                min_conns: vars.parse("DB_MIN_CONNS", 5),
                max_conn_lifetime: vars.duration("DB_MAX_CONN_LIFETIME", Duration::from_secs(300)),
                max_conn_idle_time: vars.duration("DB_MAX_CONN_IDLE_TIME", Duration::from_secs(60)),
                acquire_timeout: vars.duration("DB_ACQUIRE_TIMEOUT", Duration::from_secs(5)),
            },
            redis: RedisConfig {
                url: vars.optional("REDIS_URL"),
                host: vars.string("REDIS_HOST", "localhost"),
                port: vars.parse("REDIS_PORT", 6379),
                password: vars.string("REDIS_PASSWORD", ""),
                db: vars.parse("REDIS_DB", 0),
                max_retries: vars.parse("REDIS_MAX_RETRIES", 3),
                connect_timeout: vars.duration("REDIS_CONNECT_TIMEOUT", Duration::from_secs(5)),
                response_timeout: vars.duration("REDIS_RESPONSE_TIMEOUT", Duration::from_secs(3)),
            },
            cache_ttl: vars.duration("CACHE_TTL", Duration::from_secs(300)),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url);
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(PgSslMode::from_str(&self.ssl_mode)?))
    }
}

impl RedisConfig {
    /// 未设置 REDIS_URL 时按字段组装，密码不经过 URL 编码，任意字符都可以使用
    pub fn connection_info(&self) -> RedisResult<ConnectionInfo> {
        if let Some(url) = &self.url {
            return url.as_str().into_connection_info();
        }

        Ok(ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                password: Some(self.password.clone()).filter(|p| !p.is_empty()),
                ..Default::default()
            },
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.optional(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
                default
            }),
            None => default,
        }
    }

    fn duration(&self, key: &str, default: Duration) -> Duration {
        match self.optional(key) {
            Some(raw) => parse_duration(&raw).unwrap_or_else(|| {
                tracing::warn!("Invalid duration {:?} for {}, using default", raw, key);
                default
            }),
            None => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);

        assert_eq!(config.server.address(), "0.0.0.0:5000");
        assert_eq!(config.server.read_timeout, Duration::from_secs(10));
        assert_eq!(config.server.write_timeout, Duration::from_secs(10));
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(config.database.max_conns, 25);
        assert_eq!(config.database.min_conns, 5);
        assert_eq!(config.database.max_conn_lifetime, Duration::from_secs(300));
        assert_eq!(config.database.max_conn_idle_time, Duration::from_secs(60));
        let redis = config.redis.connection_info().unwrap();
        assert_eq!(redis.addr, ConnectionAddr::Tcp("localhost".into(), 6379));
        assert_eq!(redis.redis.db, 0);
        assert_eq!(redis.redis.password, None);
        assert_eq!(config.redis.max_retries, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("SERVER_PORT", "8080"),
            ("CACHE_TTL", "30s"),
            ("DB_MAX_CONNS", "50"),
            ("REDIS_PASSWORD", "secret"),
            ("REDIS_DB", "2"),
        ]);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.database.max_conns, 50);
        let redis = config.redis.connection_info().unwrap();
        assert_eq!(redis.redis.password.as_deref(), Some("secret"));
        assert_eq!(redis.redis.db, 2);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[("SERVER_PORT", "not-a-port"), ("CACHE_TTL", "soon")]);

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn explicit_urls_take_precedence() {
        let config = config_from(&[
            ("REDIS_URL", "redis://cache:6380/1"),
            ("DATABASE_URL", "postgres://u:p@db:5433/visits"),
        ]);

        let redis = config.redis.connection_info().unwrap();
        assert_eq!(redis.addr, ConnectionAddr::Tcp("cache".into(), 6380));
        assert_eq!(redis.redis.db, 1);
        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("visits"));
    }

    #[test]
    fn redis_password_with_url_delimiters_is_kept_verbatim() {
        for password in ["pa/ss", "pa#ss", "pa?ss", "p%41ss@x:y"] {
            let config = config_from(&[("REDIS_PASSWORD", password), ("REDIS_HOST", "cache")]);
            let redis = config.redis.connection_info().unwrap();

            assert_eq!(redis.addr, ConnectionAddr::Tcp("cache".into(), 6379));
            assert_eq!(redis.redis.password.as_deref(), Some(password));
        }
    }

    #[test]
    fn connect_options_built_from_parts() {
        let config = config_from(&[("DB_HOST", "pg"), ("DB_NAME", "counter")]);
        let options = config.database.connect_options().unwrap();

        assert_eq!(options.get_host(), "pg");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "user");
        assert_eq!(options.get_database(), Some("counter"));
    }

    #[test]
    fn unknown_ssl_mode_is_rejected() {
        let config = config_from(&[("DB_SSLMODE", "sometimes")]);
        assert!(config.database.connect_options().is_err());
    }
}
