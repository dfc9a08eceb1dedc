//! OverTeX API Server
//!
//! Compiles LaTeX projects living under a workspace root and serves the
//! resulting PDF to the editor frontend.
//!
//! ## Endpoints
//!
//! - `POST /api/build` - run latexmk (or another engine) on a source file
//! - `GET /api/build/status` - idle placeholder
//! - `GET /api/pdf` - the most recent PDF
//! - `GET /health`, `GET /ready` - liveness and readiness probes
//!
//! ## Middleware
//!
//! - Per-IP rate limiting via tower-governor (general /api limit plus a
//!   stricter one on builds)
//! - CORS restricted to configured origins
//! - Security response headers and a request body cap

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, MethodRouter},
    Router,
};
use clap::Parser;
use governor::middleware::NoOpMiddleware;
use latex_engine::LatexService;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod state;
mod validation;

use api::{
    handle_build, handle_build_status, handle_health, handle_not_found, handle_pdf, handle_ready,
};
use config::{Args, Environment, HttpOptions, Quota};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args)?;

    info!(
        "Starting OverTeX server on {}:{} ({})",
        args.host,
        args.port,
        args.environment.as_str()
    );

    let latex = LatexService::new(args.engine_config());
    if !latex.check_latex_installed().await {
        warn!("latexmk not found on PATH; builds will fail until it is installed");
    }

    let state = AppState::new(latex, args.pdf_path(), args.environment);
    let options = args.http_options()?;
    let app = build_router(state, &options);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Workspace root: {}", args.workspace_root.display());
    info!("Build timeout: {}ms", args.build_timeout_ms);
    info!("CORS origins: {}", options.cors_origins.join(", "));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(args.log_directive().parse()?)
        .add_directive("tower_http=debug".parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    match args.environment {
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        Environment::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    Ok(())
}

/// Assemble routes and middleware.
///
/// Rate limiting is only attached when `options.rate_limits` is set, since the
/// per-IP key needs `ConnectInfo` from the real listener.
pub fn build_router(state: AppState, options: &HttpOptions) -> Router {
    let mut build_route: MethodRouter<AppState> = post(handle_build);
    if let Some(limits) = &options.rate_limits {
        if let Some(layer) = governor_layer(limits.build) {
            build_route = build_route.layer(layer);
        }
    }

    let mut api_routes = Router::new()
        .route("/api/build", build_route)
        .route("/api/build/status", get(handle_build_status))
        .route("/api/pdf", get(handle_pdf));
    if let Some(limits) = &options.rate_limits {
        if let Some(layer) = governor_layer(limits.api) {
            api_routes = api_routes.layer(layer);
        }
    }

    Router::new()
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .merge(api_routes)
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&options.cors_origins))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("cross-origin-resource-policy"),
                    HeaderValue::from_static("cross-origin"),
                )),
        )
        .with_state(state)
}

fn governor_layer(quota: Quota) -> Option<GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware>> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(quota.period_ms)
        .burst_size(quota.burst)
        .finish()?;
    Some(GovernorLayer {
        config: Arc::new(config),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
