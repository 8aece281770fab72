use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{Post, PostRepository};
use crate::error::{AppError, AppResult};
use crate::routes::Lang;
use crate::AppState;

/// Router for blog posts
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_posts))
        .route("/:slug", get(get_post))
}

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostQuery>,
) -> Json<Vec<Post>> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
    Json(PostRepository::list(&state.store, category, query.limit).await)
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Path(slug): Path<String>,
) -> AppResult<Json<Post>> {
    PostRepository::find(&state.store, &slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(lang.t("not_found.post")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn lists_newest_first_and_finds_by_slug() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let resp = send(&app, json_request("GET", "/api/posts", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let posts = body_json(resp).await;
        let posts = posts.as_array().unwrap();
        assert!(posts.len() >= 2);
        assert!(posts[0]["date"].as_str() >= posts[1]["date"].as_str());

        let slug = posts[0]["slug"].as_str().unwrap().to_string();
        let resp = send(&app, json_request("GET", &format!("/api/posts/{}", slug), None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["slug"], slug.as_str());

        let resp = send(&app, json_request("GET", "/api/posts?limit=1", None, None)).await;
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_post_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(test_state(dir.path()));

        let resp = send(&app, json_request("GET", "/api/posts/no-such-post", None, None)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
