//! Startup helpers: storage bootstrap and background worker spawning.
//!
//! Keeps the wiring out of `main.rs`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::{DataStore, LocalStore, SupabaseClient};
use crate::services::mirror::MirrorService;

/// Build the tiered data store from configuration.
///
/// Creates the data and uploads directories when possible. A read-only
/// filesystem is not fatal: the in-memory tier keeps the service usable.
pub async fn init_store(config: &Config) -> DataStore {
    for dir in [&config.storage.data_dir, &config.storage.uploads_dir] {
        match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tracing::info!("Storage directory ready: {}", dir.display()),
            Err(e) => tracing::warn!(
                "Could not create storage directory {}: {}. Falling back to memory for writes.",
                dir.display(),
                e
            ),
        }
    }

    let remote = Arc::from(SupabaseClient::from_config(&config.supabase));
    DataStore::new(remote, LocalStore::new(config.storage.data_dir.clone()))
}

/// Log configuration that is valid but unsafe for production.
pub fn warn_insecure_defaults(config: &Config) {
    if config.uses_default_admin() {
        tracing::warn!(
            "Bootstrap admin uses the built-in credentials ({}). Set ADMIN_EMAIL and ADMIN_PASSWORD.",
            config.admin.email
        );
    }
    if config.jwt.secret.len() < 32 {
        tracing::warn!("JWT_SECRET is shorter than 32 characters");
    }
}

/// Spawn background workers:
/// - periodic Supabase -> local JSON mirroring (only when the remote is enabled)
///
/// Returns the `JoinHandle<()>`s so callers can await task shutdown. Each
/// worker listens for a shutdown notification on the broadcast channel.
pub fn spawn_background_workers(
    state: Arc<crate::AppState>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    if !state.config.mirror.enabled {
        tracing::info!("Mirror worker disabled by configuration");
        return handles;
    }
    if !state.store.remote_enabled() {
        tracing::info!("Mirror worker not started: Supabase is not configured");
        return handles;
    }

    // Mirror worker
    {
        let mut shutdown_rx = shutdown.subscribe();
        let state = state.clone();
        let interval = Duration::from_secs(state.config.mirror.interval_seconds.max(1));
        handles.push(tokio::spawn(async move {
            loop {
                tracing::debug!("Starting Supabase mirror pass");

                let report = MirrorService::mirror_all(&state.store).await;
                if report.failed.is_empty() {
                    tracing::info!(
                        "Mirrored {} records across {} collections",
                        report.records,
                        report.collections
                    );
                } else {
                    tracing::warn!(
                        "Mirror pass incomplete; failed collections: {:?}",
                        report.failed
                    );
                }

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Mirror worker shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }));
    }

    handles
}
