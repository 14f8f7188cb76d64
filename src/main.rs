use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use lexpath_gateway::{
    AppState,
    cache::RedisUsageLedger,
    config::Config,
    providers::HttpProviders,
    routes,
    usage::{MemoryUsageLedger, UsageLedger},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Arc::new(Config::from_env());

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, free requests will report a configuration error");
    }

    // 用量账本：配置了 Redis 就用 Redis，否则退回进程内存
    let ledger: Arc<dyn UsageLedger> = match config.redis_url.as_deref() {
        Some(url) => match redis::Client::open(url) {
            Ok(client) => {
                tracing::info!("Using Redis usage ledger");
                Arc::new(RedisUsageLedger::new(
                    Arc::new(client),
                    config.usage_window_ms,
                ))
            }
            Err(e) => {
                tracing::error!("Invalid REDIS_URL ({}), falling back to in-memory ledger", e);
                Arc::new(MemoryUsageLedger::new(config.usage_window_ms))
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, using in-memory usage ledger");
            Arc::new(MemoryUsageLedger::new(config.usage_window_ms))
        }
    };

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        ledger,
        providers: Arc::new(HttpProviders::new(config.clone())),
    };

    let app = routes::create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
