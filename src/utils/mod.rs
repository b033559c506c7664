use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};

/// 解析形如 `500ms`、`10s`、`5m`、`1h30m` 的时长，纯数字按秒处理
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw).ok()
}

/// 去掉连接地址末尾的端口
pub fn strip_port(addr: &str) -> &str {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        // IPv6 形如 [::1]:8080，需要去掉方括号
        return match socket {
            SocketAddr::V4(_) => addr.rsplit_once(':').map_or(addr, |(host, _)| host),
            SocketAddr::V6(_) => addr
                .rsplit_once(':')
                .map_or(addr, |(host, _)| host.trim_start_matches('[').trim_end_matches(']')),
        };
    }
    match addr.rsplit_once(':') {
        // 裸 IPv6 地址本身含冒号，不能按端口截断
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host
        }
        _ => addr,
    }
}

/// 解析客户端 IP：优先 X-Forwarded-For 的第一项，其次 X-Real-IP，最后使用连接地址
pub fn resolve_client_ip(headers: &HeaderMap, remote_addr: Option<&str>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.split(',').next())
        .map(str::trim);
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    remote_addr.map(strip_port).unwrap_or_default().to_string()
}

/// 请求方 IP 提取器，取不到任何地址时为空字符串，交由服务层拒绝
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.to_string());

        Ok(ClientIp(resolve_client_ip(
            &parts.headers,
            remote_addr.as_deref(),
        )))
    }
}
