use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    AppState,
    middleware::{log_errors, make_request_span},
    routes,
};

// 访问计数相关的路由
fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(routes::visit::ping))
        .route("/visits", get(routes::visit::visit_count))
}

// 创建主路由
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;

    // 外层在前：请求ID -> 日志 span -> 回写请求ID -> panic 恢复 -> 压缩 -> CORS -> 超时
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyTimeoutLayer::new(server.read_timeout))
        .layer(TimeoutLayer::new(server.write_timeout));

    Router::new()
        .route("/health", get(routes::health))
        .merge(visit_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(middleware)
        .with_state(state)
}
