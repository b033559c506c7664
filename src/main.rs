use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visit_counter::{
    AppState, build_router,
    cache::RedisCacheRepository,
    config::Config,
    database::{MIGRATOR, PgVisitRepository},
    service::VisitService,
};

#[tokio::main]
async fn main() {
    // 初始化日志，LOG_FORMAT=json 时输出结构化 JSON
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // 加载配置
    let config = Config::from_env();

    if let Err(e) = run(config).await {
        tracing::error!("Application failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    // 设置数据库连接池
    let db = &config.database;
    let pool = PgPoolOptions::new()
        .max_connections(db.max_conns)
        .min_connections(db.min_conns)
        .max_lifetime(db.max_conn_lifetime)
        .idle_timeout(db.max_conn_idle_time)
        .acquire_timeout(db.acquire_timeout)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'visit_counter';")
                    .await?;
                Ok(())
            })
        })
        .connect_with(db.connect_options().context("invalid database configuration")?)
        .await
        .context("failed to connect to Postgres")?;
    tracing::info!("Connected to PostgreSQL");

    MIGRATOR
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    // 设置 Redis 缓存
    let cache = RedisCacheRepository::connect(&config.redis)
        .await
        .context("failed to connect to Redis")?;
    tracing::info!("Connected to Redis");

    // 设置应用状态
    let visits = VisitService::with_ttl(
        Arc::new(PgVisitRepository::new(pool.clone())),
        Arc::new(cache),
        config.cache_ttl,
    );
    let state = AppState {
        visits,
        config: config.clone(),
    };
    let app = build_router(state);

    // 启动服务器
    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    let shutdown = Arc::new(Notify::new());
    let mut server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await
        }
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task panicked")?.context("server error")?;
        }
        signal = shutdown_signal() => {
            tracing::info!("Shutdown signal received: {}", signal);
            shutdown.notify_one();

            match tokio::time::timeout(config.server.shutdown_timeout, &mut server).await {
                Ok(result) => {
                    result.context("server task panicked")?.context("server error")?;
                    tracing::info!("Server stopped gracefully");
                }
                Err(_) => {
                    tracing::error!(
                        "Graceful shutdown timed out after {:?}, aborting open connections",
                        config.server.shutdown_timeout
                    );
                    server.abort();
                }
            }
        }
    }

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
