use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::routes::Lang;
use crate::services::auth::{AuthService, SessionUser};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn login(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) =
        AuthService::login(&state, &body.email, &body.password, Some(lang.0.as_str())).await?;

    Ok(Json(LoginResponse {
        token,
        user,
        message: lang.t("auth.logged_in"),
    }))
}

async fn me(AuthUser(user): AuthUser) -> Json<SessionUser> {
    Json(user)
}

// ============================================================================
// Extractors
// ============================================================================

/// Extractor for an authenticated session (`Authorization: Bearer <jwt>`).
pub struct AuthUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing or invalid Authorization header");
                AppError::Unauthorized
            })?;

        if !auth_header.to_ascii_lowercase().starts_with("bearer ") {
            tracing::debug!("Authorization header doesn't start with 'Bearer '");
            return Err(AppError::Unauthorized);
        }

        let token = auth_header[7..].trim();
        if token.is_empty() {
            tracing::debug!("Empty bearer token in Authorization header");
            return Err(AppError::Unauthorized);
        }

        let claims = AuthService::decode_jwt(state, token)?;
        tracing::debug!("Authenticated user: {}", claims.sub);
        Ok(AuthUser(SessionUser::from(claims)))
    }
}

/// Authenticated session whose role is `admin`; other roles get 403.
pub struct AdminUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(AdminUser(user))
    }
}

pub fn require_admin(user: &SessionUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::debug!("User {} with role {} denied admin access", user.id, user.role);
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn login_returns_token_without_password() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());

        let body = json!({
            "email": state.config.admin.email,
            "password": state.config.admin.password,
        });
        let resp = send(&app, json_request("POST", "/api/auth/login", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let token = json["token"].as_str().unwrap().to_string();
        assert_eq!(json["user"]["role"], "admin");
        assert!(json["user"].get("password").is_none());

        let resp = send(&app, json_request("GET", "/api/auth/me", Some(&token), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let me = body_json(resp).await;
        assert_eq!(me["email"], state.config.admin.email);
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let body = json!({ "email": "admin@example.com", "password": "nope" });
        let resp = send(&app, json_request("POST", "/api/auth/login", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn bad_credentials_message_follows_accept_language() {
        use axum::body::Body;
        use axum::http::Request;

        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .header("accept-language", "ru")
            .body(Body::from(r#"{"email":"admin@example.com","password":"nope"}"#))
            .unwrap();
        let resp = send(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["message"], "Неверный email или пароль");
    }

    #[tokio::test]
    async fn me_requires_a_valid_bearer_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let resp = send(&app, json_request("GET", "/api/auth/me", None, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send(&app, json_request("GET", "/api/auth/me", Some("garbage"), None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "INVALID_TOKEN");
    }
}
