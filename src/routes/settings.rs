use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;

use crate::db::{Settings, SettingsRepository};
use crate::error::AppResult;
use crate::routes::auth::AdminUser;
use crate::AppState;

/// Router for site-wide settings (stats, contact, social links)
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(SettingsRepository::get(&state.store).await)
}

/// Deep-merge the body into the stored settings.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(body): Json<Value>,
) -> AppResult<Json<Settings>> {
    let updated = SettingsRepository::update(&state.store, body).await?;
    tracing::info!("Settings updated by {}", admin.id);
    Ok(Json(updated))
}
