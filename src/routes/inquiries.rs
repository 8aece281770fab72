use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{Inquiry, InquiryRepository, InquiryStatus};
use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::routes::auth::AuthUser;
use crate::routes::Lang;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_inquiries).post(create_inquiry))
        .route("/:id", patch(update_inquiry).delete(delete_inquiry))
}

#[derive(Debug, Deserialize)]
pub struct InquiryQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedInquiry {
    pub message: String,
    pub inquiry: Inquiry,
}

fn parse_status(raw: &str) -> AppResult<InquiryStatus> {
    InquiryStatus::from_str(raw).ok_or_else(|| {
        AppError::Validation(i18n::t_with("validation.invalid_status", &[("status", raw)]))
    })
}

async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<InquiryQuery>,
) -> AppResult<Json<Vec<Inquiry>>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(parse_status(raw)?),
    };
    Ok(Json(InquiryRepository::list(&state.store, status).await))
}

async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Json(body): Json<Inquiry>,
) -> AppResult<(StatusCode, Json<CreatedInquiry>)> {
    let inquiry = InquiryRepository::create(&state.store, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedInquiry {
            message: lang.t("inquiry.received"),
            inquiry,
        }),
    ))
}

async fn update_inquiry(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateInquiryRequest>,
) -> AppResult<Json<Inquiry>> {
    let status = parse_status(&body.status)?;
    Ok(Json(
        InquiryRepository::update_status(&state.store, id, status).await?,
    ))
}

async fn delete_inquiry(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    lang: Lang,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    InquiryRepository::delete(&state.store, id).await?;
    tracing::info!("User {} deleted inquiry {}", user.id, id);
    Ok(Json(json!({ "message": lang.t("inquiry.deleted"), "id": id })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn public_submit_then_staff_manage() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());

        let body = json!({
            "name": "Dana",
            "email": "dana@example.com",
            "message": "Is the villa still available?",
            "propertyId": "2",
            "status": "archived"
        });
        let resp = send(&app, json_request("POST", "/api/inquiries", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let inquiry = &created["inquiry"];
        assert_eq!(inquiry["status"], "new");
        assert_eq!(inquiry["property_id"], 2);
        let id = inquiry["id"].as_i64().unwrap();

        let resp = send(&app, json_request("GET", "/api/inquiries", None, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let token = token_for(&state, "agent");
        let uri = format!("/api/inquiries/{}", id);
        let resp = send(
            &app,
            json_request("PATCH", &uri, Some(&token), Some(json!({ "status": "replied" }))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "replied");

        let resp = send(
            &app,
            json_request("GET", "/api/inquiries?status=new", Some(&token), None),
        )
        .await;
        assert!(body_json(resp).await.as_array().unwrap().is_empty());

        let resp = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_submissions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());

        let body = json!({ "name": "Dana", "email": "not-an-email", "message": "hi" });
        let resp = send(&app, json_request("POST", "/api/inquiries", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json!({ "name": "", "email": "dana@example.com", "message": "hi" });
        let resp = send(&app, json_request("POST", "/api/inquiries", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let token = token_for(&state, "agent");
        let resp = send(
            &app,
            json_request("GET", "/api/inquiries?status=bogus", Some(&token), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
