mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageConfig};
use crate::core::{database, middleware};
use crate::features::categories::PgCategoryStore;
use crate::features::packages::{self, PackageService, PackageState, PgPackageStore};
use crate::features::parlors::PgParlorStore;
use crate::modules::storage::{FileStorage, LocalStorage, MinIOClient};
use crate::shared::views::TemplateEngine;
use axum::Router;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // Initialize file storage; local uploads are also served by this process
    let (storage, uploads): (Arc<dyn FileStorage>, Option<Router>) = match config.storage.clone()
    {
        StorageConfig::Local(local_config) => {
            let local = LocalStorage::new(local_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize local storage: {}", e))?;

            let uploads = if local.public_url().starts_with('/') && local.public_url() != "/" {
                Some(Router::new().nest_service(local.public_url(), ServeDir::new(local.public_dir())))
            } else {
                tracing::info!(
                    "Local uploads are served externally at {}",
                    local.public_url()
                );
                None
            };

            (Arc::new(local) as Arc<dyn FileStorage>, uploads)
        }
        StorageConfig::MinIO(minio_config) => {
            let minio_client = MinIOClient::new(minio_config)
                .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
            // Ensure bucket exists (create if not)
            minio_client
                .ensure_bucket_exists()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
            tracing::info!(
                "MinIO client initialized for bucket: {}",
                minio_client.bucket_name()
            );

            (Arc::new(minio_client) as Arc<dyn FileStorage>, None)
        }
    };

    // Initialize views
    let views = Arc::new(
        TemplateEngine::with_overrides(&config.views.template_dir)
            .map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?,
    );
    tracing::info!(
        "Template engine initialized with {} templates",
        views.template_names().len()
    );

    // Initialize Package Service
    let package_service = Arc::new(PackageService::new(
        Arc::new(PgPackageStore::new(pool.clone())),
        Arc::new(PgCategoryStore::new(pool.clone())),
        Arc::new(PgParlorStore::new(pool.clone())),
        storage,
    ));
    tracing::info!("Package service initialized");

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let mut router = Router::new()
        .merge(packages::routes(
            PackageState::new(package_service, views),
            config.app.max_request_body_size,
        ))
        .merge(health_route);
    if let Some(uploads) = uploads {
        router = router.merge(uploads);
    }

    let app = middleware::with_method_override(router)
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
