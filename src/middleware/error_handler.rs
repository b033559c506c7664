use axum::{
    body::{Body, to_bytes},
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

/// 错误响应体最多读取的字节数，超出时改为返回状态描述
const MAX_LOGGED_BODY: usize = 64 * 1024;

pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(b) => b,
            Err(e) => {
                error!(
                    %method,
                    %uri,
                    status = %parts.status,
                    error = %e,
                    "Server error occurred, body could not be read"
                );
                let reason = parts.status.canonical_reason().unwrap_or("Server Error");
                parts.headers.remove(header::CONTENT_LENGTH);
                parts.headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                return Response::from_parts(parts, Body::from(reason));
            }
        };
        let body_str = String::from_utf8_lossy(&bytes);

        error!(
            %method,
            %uri,
            status = %parts.status,
            body = %body_str,
            "Server error occurred"
        );

        // 重置body以便重新构建响应
        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
