use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::db::{Property, PropertyFilter, PropertyRepository};
use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::routes::auth::AuthUser;
use crate::routes::Lang;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route(
            "/:id",
            get(get_property)
                .put(replace_property)
                .patch(patch_property)
                .delete(delete_property),
        )
}

async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PropertyFilter>,
) -> Json<Vec<Property>> {
    Json(PropertyRepository::list(&state.store, &filter).await)
}

async fn get_property(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Path(id): Path<i64>,
) -> AppResult<Json<Property>> {
    PropertyRepository::find_by_id(&state.store, id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(lang.t("not_found.property")))
}

async fn create_property(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<Property>,
) -> AppResult<(StatusCode, Json<Property>)> {
    let created = PropertyRepository::create(&state.store, body).await?;
    tracing::info!("User {} created property {}", user.id, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_property(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<Property>,
) -> AppResult<Json<Property>> {
    Ok(Json(PropertyRepository::replace(&state.store, id, body).await?))
}

async fn patch_property(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> AppResult<Json<Property>> {
    if !body.is_object() {
        return Err(AppError::Validation(i18n::t_with(
            "validation.property_shape",
            &[("err", "expected a JSON object")],
        )));
    }
    Ok(Json(PropertyRepository::patch(&state.store, id, body).await?))
}

async fn delete_property(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    lang: Lang,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    PropertyRepository::delete(&state.store, id).await?;
    tracing::info!("User {} deleted property {}", user.id, id);
    Ok(Json(json!({ "message": lang.t("property.deleted"), "id": id })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn lists_defaults_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let resp = send(&app, json_request("GET", "/api/properties", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let all = body_json(resp).await;
        let total = all.as_array().unwrap().len();
        assert!(total > 0);

        let resp = send(&app, json_request("GET", "/api/properties?limit=1", None, None)).await;
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

        let resp = send(
            &app,
            json_request("GET", "/api/properties?min_price=999999999999", None, None),
        )
        .await;
        assert!(body_json(resp).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());
        let token = token_for(&state, "admin");

        let body = json!({ "title": "Sea View Loft", "price": 250000, "location": "Harbor", "type": "Apartment" });
        let resp = send(&app, json_request("POST", "/api/properties", Some(&token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["status"], "For Sale");
        assert!(created["created_at"].is_string());

        let uri = format!("/api/properties/{}", id);
        let resp = send(
            &app,
            json_request("PATCH", &uri, Some(&token), Some(json!({ "featured": true }))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let patched = body_json(resp).await;
        assert_eq!(patched["featured"], true);
        assert_eq!(patched["title"], "Sea View Loft");

        let resp = send(
            &app,
            json_request("PUT", &uri, Some(&token), Some(json!({ "title": "Renamed", "price": 1 }))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let replaced = body_json(resp).await;
        assert_eq!(replaced["title"], "Renamed");
        assert_eq!(replaced["featured"], false);
        assert_eq!(replaced["created_at"], created["created_at"]);

        let resp = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(&app, json_request("GET", &uri, None, None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_with_alias_field_names_updates_listing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());
        let token = token_for(&state, "agent");

        let resp = send(&app, json_request("GET", "/api/properties", None, None)).await;
        let id = body_json(resp).await[0]["id"].as_i64().unwrap();

        let uri = format!("/api/properties/{}", id);
        let resp = send(
            &app,
            json_request("PATCH", &uri, Some(&token), Some(json!({ "bedrooms": 4 }))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["beds"], 4);
    }

    #[tokio::test]
    async fn mutations_require_auth_and_valid_input() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test_app(state.clone());

        let body = json!({ "title": "X", "price": 1 });
        let resp = send(&app, json_request("POST", "/api/properties", None, Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let token = token_for(&state, "agent");
        let body = json!({ "title": "", "price": 1 });
        let resp = send(&app, json_request("POST", "/api/properties", Some(&token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json!({ "title": "Cheap", "price": -5 });
        let resp = send(&app, json_request("POST", "/api/properties", Some(&token), Some(body))).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = send(
            &app,
            json_request("DELETE", "/api/properties/123456", Some(&token), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
