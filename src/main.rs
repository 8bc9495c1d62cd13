use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use pitlane_core::core::config::Config;
use pitlane_core::core::openapi::{ApiDoc, SwaggerInfoModifier};
use pitlane_core::core::{database, middleware};
use pitlane_core::features::auth::{
    self, AuthState, JwksClient, JwtValidator, PgProfileRepository, ProfileResolver,
};
use pitlane_core::features::gallery::{self, GalleryService};
use pitlane_core::features::garage::{self, GarageService, PgGarageRepository};
use pitlane_core::features::inbox::{self, InboxNotifier, InboxService, PgInboxRepository};
use pitlane_core::modules::realtime::RealtimeHub;
use pitlane_core::modules::rpc::PgRpcClient;
use pitlane_core::modules::storage::S3Storage;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // .env first so RUST_LOG is honoured
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        worker_threads,
        pid = std::process::id(),
        "Configuration loaded"
    );

    let pool = database::connect(&config.database).await?;

    // Auth: token verification, then profile lookup
    let jwks_client = Arc::new(JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    let auth_state = Arc::new(AuthState {
        validator: jwt_validator,
        resolver: ProfileResolver::new(Arc::new(PgProfileRepository::new(pool.clone()))),
    });
    tracing::info!(issuer = %config.auth.issuer, "Auth initialized");

    // Realtime hub and inbox
    let hub = Arc::new(RealtimeHub::new(config.realtime.channel_capacity));
    let notifier = Arc::new(InboxNotifier::new(
        hub.clone(),
        config.realtime.publish_retries,
    ));
    let inbox_service = Arc::new(InboxService::new(
        Arc::new(PgInboxRepository::new(pool.clone())),
        notifier,
        config.inbox.clone(),
    ));
    tracing::info!(
        channel_capacity = config.realtime.channel_capacity,
        publish_retries = config.realtime.publish_retries,
        "Inbox service initialized"
    );

    // Object storage for garage photos
    let storage = Arc::new(
        S3Storage::new(&config.storage)
            .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?,
    );
    storage.ensure_bucket_exists().await;
    tracing::info!(bucket = %storage.bucket_name(), "Object storage initialized");

    let garage_service = Arc::new(GarageService::new(
        Arc::new(PgGarageRepository::new(pool.clone())),
        storage,
    ));
    let gallery_service = Arc::new(GalleryService::new(Arc::new(PgRpcClient::new(
        pool.clone(),
    ))));
    tracing::info!("Gallery and garage services initialized");

    // Swagger UI, optionally behind basic auth
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };
    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi);
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new().merge(swagger_ui).layer(from_fn_with_state(
            Arc::new(credentials),
            middleware::swagger_basic_auth,
        ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(swagger_ui)
    };

    // Protected routes (bearer token + resolved profile)
    let protected_routes = Router::new()
        .merge(auth::routes::protected_routes())
        .merge(inbox::routes(inbox_service, hub))
        .merge(garage::routes(garage_service))
        .route_layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    // Public routes
    let public_routes = Router::new()
        .merge(gallery::routes(gallery_service))
        .route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or keep the client's)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    // Long-lived SSE connections: detect dead peers
    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    #[cfg(target_os = "linux")]
    let keepalive = keepalive
        .with_interval(std::time::Duration::from_secs(10))
        .with_retries(3);
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
