use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::error::{AppError, AppResult};
use crate::routes::auth::AuthUser;
use crate::routes::Lang;
use crate::services::uploads::{StoredUpload, UploadService};
use crate::AppState;

const FILE_FIELDS: &[&str] = &["file", "image"];

/// Router for image uploads. The caller sets the body size limit.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(upload))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    lang: Lang,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<StoredUpload>)> {
    while let Some(field) = multipart.next_field().await? {
        if !field.name().map_or(false, |n| FILE_FIELDS.contains(&n)) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest(lang.t("upload.empty_file")));
        }
        if bytes.len() > state.config.storage.max_upload_bytes {
            return Err(AppError::PayloadTooLarge);
        }

        let stored = UploadService::store(
            &state.store,
            &state.config.storage.uploads_dir,
            file_name.as_deref(),
            &content_type,
            bytes.to_vec(),
        )
        .await;
        tracing::info!(
            "User {} uploaded {} ({} bytes, {:?})",
            user.id,
            stored.name,
            stored.size,
            stored.storage
        );
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(AppError::BadRequest(lang.t("upload.missing_file")))
}
