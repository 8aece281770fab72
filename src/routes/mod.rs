use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::request::Parts,
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::i18n;
use crate::AppState;

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod inquiries;
pub mod newsletter;
pub mod posts;
pub mod properties;
pub mod settings;
pub mod upload;

/// All HTTP routes. `auth` and `newsletter` are passed in so the caller can
/// wrap them in rate limiting layers.
pub fn api_router(
    config: &Config,
    auth: Router<Arc<AppState>>,
    newsletter: Router<Arc<AppState>>,
) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/properties", properties::router())
        .nest("/api", catalog::router())
        .nest("/api/inquiries", inquiries::router())
        .nest("/api/settings", settings::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/posts", posts::router())
        .nest(
            "/api/upload",
            upload::router().layer(DefaultBodyLimit::max(config.storage.max_upload_bytes)),
        )
        .nest("/api/auth", auth)
        .nest("/api/newsletter", newsletter)
        .nest_service("/uploads", ServeDir::new(&config.storage.uploads_dir))
}

/// Preferred response language from `Accept-Language`; English when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lang(pub String);

impl Lang {
    pub fn t(&self, key: &str) -> String {
        i18n::tr(Some(self.0.as_str()), key, None)
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang(i18n::DEFAULT_LANG.to_string())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(http::header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(i18n::language_from_header)
            .map(Lang)
            .unwrap_or_default())
    }
}
