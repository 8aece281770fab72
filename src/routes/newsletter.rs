use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::{Subscriber, SubscriberRepository};
use crate::error::AppResult;
use crate::routes::Lang;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/subscribe", post(subscribe))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: String,
    pub subscriber: Subscriber,
    pub already_subscribed: bool,
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Json(body): Json<SubscribeRequest>,
) -> AppResult<(StatusCode, Json<SubscribeResponse>)> {
    let (subscriber, created) = SubscriberRepository::subscribe(&state.store, &body.email).await?;

    let (status, key) = if created {
        (StatusCode::CREATED, "newsletter.subscribed")
    } else {
        (StatusCode::OK, "newsletter.already_subscribed")
    };

    Ok((
        status,
        Json(SubscribeResponse {
            message: lang.t(key),
            subscriber,
            already_subscribed: !created,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn duplicate_subscription_is_200() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let body = json!({ "email": "Reader@Example.com" });
        let resp = send(
            &app,
            json_request("POST", "/api/newsletter/subscribe", None, Some(body.clone())),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["subscriber"]["email"], "reader@example.com");

        let resp = send(
            &app,
            json_request("POST", "/api/newsletter/subscribe", None, Some(body)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["already_subscribed"], true);
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/newsletter/subscribe",
                None,
                Some(json!({ "email": "nope" })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
