use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use axum::body::Body;
use axum::response::IntoResponse;
use http::{HeaderValue, StatusCode};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod i18n;
mod middleware;
mod routes;
mod services;

use config::Config;
use db::DataStore;
use error::AppError;
use services::init;

pub struct AppState {
    pub store: DataStore,
    pub config: Config,
}

/// Shared 429 handler for every rate limiter, in the same shape as `AppError`.
fn rate_limit_response(error: GovernorError) -> http::Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut resp = AppError::RateLimited
                .with_details(serde_json::json!({ "retry_after_seconds": wait_time }))
                .into_response();

            if let Some(hmap) = headers {
                for (name, value) in hmap.iter() {
                    resp.headers_mut().append(name.clone(), value.clone());
                }
            }
            resp.headers_mut()
                .insert(http::header::RETRY_AFTER, HeaderValue::from(wait_time));
            resp
        }
        GovernorError::UnableToExtractKey => AppError::BadRequest(
            "Unable to determine client IP for rate limiting".to_string(),
        )
        .into_response(),
        GovernorError::Other { code, msg, headers } => {
            let body = serde_json::json!({
                "error": {
                    "code": "RATE_LIMIT_ERROR",
                    "message": msg.unwrap_or_else(|| "Rate limiting error".to_string()),
                }
            });
            let status =
                StatusCode::from_u16(code.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut resp = (status, axum::Json(body)).into_response();
            if let Some(hmap) = headers {
                for (name, value) in hmap.iter() {
                    resp.headers_mut().append(name.clone(), value.clone());
                }
            }
            resp
        }
    }
}

/// Periodically evict stale limiter entries on a std thread until `flag` is set.
fn spawn_limiter_cleanup<F>(
    name: &'static str,
    flag: Arc<AtomicBool>,
    retain: F,
) -> std::thread::JoinHandle<()>
where
    F: Fn() -> usize + Send + 'static,
{
    std::thread::spawn(move || {
        let interval = Duration::from_secs(60);
        let tick = Duration::from_secs(1);
        loop {
            for _ in 0..interval.as_secs() {
                if flag.load(Ordering::SeqCst) {
                    tracing::info!("{} rate limiter cleanup thread exiting", name);
                    return;
                }
                std::thread::sleep(tick);
            }
            let size = retain();
            tracing::debug!("{} rate limiter size: {}", name, size);
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to bind SIGTERM: {}", e);
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
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "estate_backend=debug,tower_http=debug".into());
    if std::env::var("LOG_FORMAT").map_or(false, |v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting {} backend", i18n::t("app.name"));
    init::warn_insecure_defaults(&config);

    let store = init::init_store(&config).await;
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    // Create shutdown notifier for background workers and std threads
    let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    let thread_shutdown = Arc::new(AtomicBool::new(false));

    let bg_handles = init::spawn_background_workers(app_state.clone(), shutdown_tx.clone());

    // Auth limiter (login attempts)
    let mut auth_builder = GovernorConfigBuilder::default().key_extractor(SmartIpKeyExtractor);
    auth_builder.per_second(config.rate_limit.auth_per_second.into());
    auth_builder.burst_size(config.rate_limit.auth_burst);
    auth_builder.error_handler(rate_limit_response);
    let auth_gov_conf = Arc::new(
        auth_builder
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build auth governor config"))?,
    );
    let auth_cleaner = {
        let limiter = auth_gov_conf.limiter().clone();
        spawn_limiter_cleanup("auth", thread_shutdown.clone(), move || {
            limiter.retain_recent();
            limiter.len()
        })
    };

    // Public form limiter (newsletter signups)
    let mut forms_builder = GovernorConfigBuilder::default().key_extractor(SmartIpKeyExtractor);
    forms_builder.per_second(config.rate_limit.forms_per_second.into());
    forms_builder.burst_size(config.rate_limit.forms_burst);
    forms_builder.error_handler(rate_limit_response);
    let forms_gov_conf = Arc::new(
        forms_builder
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build forms governor config"))?,
    );
    let forms_cleaner = {
        let limiter = forms_gov_conf.limiter().clone();
        spawn_limiter_cleanup("forms", thread_shutdown.clone(), move || {
            limiter.retain_recent();
            limiter.len()
        })
    };

    let frontend_origin = config
        .server
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("Invalid FRONTEND_URL for CORS: {}", e))?;

    let app = routes::api_router(
        &config,
        routes::auth::router().layer(GovernorLayer {
            config: auth_gov_conf,
        }),
        routes::newsletter::router().layer(GovernorLayer {
            config: forms_gov_conf,
        }),
    )
    .with_state(app_state.clone())
    .layer(axum::middleware::from_fn(middleware::csp::csp_middleware))
    .layer(TraceLayer::new_for_http())
    .layer(
        CorsLayer::new()
            .allow_origin(frontend_origin)
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::OPTIONS,
                http::Method::PATCH,
            ])
            .allow_headers([
                http::header::CONTENT_TYPE,
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::ACCEPT_LANGUAGE,
            ])
            .allow_credentials(true),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // On a shutdown signal: notify workers and threads, then let in-flight requests drain.
    let shutdown_tx_clone = shutdown_tx.clone();
    let thread_shutdown_clone = thread_shutdown.clone();
    let graceful = async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, notifying background workers and threads");
        let _ = shutdown_tx_clone.send(());
        thread_shutdown_clone.store(true, Ordering::SeqCst);
    };

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful)
    .await
    {
        tracing::error!("Server error: {}", e);
    }

    // Covers the server exiting on its own error.
    let _ = shutdown_tx.send(());
    thread_shutdown.store(true, Ordering::SeqCst);

    let shutdown_wait = Duration::from_secs(15);
    tracing::info!(
        "Waiting up to {}s for background workers to exit",
        shutdown_wait.as_secs()
    );
    let bg_wait = async {
        for h in bg_handles {
            let _ = h.await;
        }
    };
    let _ = tokio::time::timeout(shutdown_wait, bg_wait).await;

    if let Err(e) = auth_cleaner.join() {
        tracing::warn!("Auth cleanup thread join failed: {:?}", e);
    }
    if let Err(e) = forms_cleaner.join() {
        tracing::warn!("Forms cleanup thread join failed: {:?}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
