use axum::{body::Body, http::Request};
use tower_http::request_id::RequestId;
use tracing::Span;

/// 为每个请求创建带 request_id 的日志 span
pub fn make_request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}
