use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::repository::category::{count_for_category, distinct_locations, distinct_types};
use crate::db::{Category, CategoryRepository, PropertyRepository};
use crate::error::AppResult;
use crate::routes::auth::AdminUser;
use crate::routes::Lang;
use crate::AppState;

/// Catalog lookups derived from listings: categories, types and locations.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", delete(delete_category))
        .route("/types", get(list_types))
        .route("/locations", get(list_locations))
}

#[derive(Debug, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryWithCount>> {
    let (categories, properties) = futures::join!(
        CategoryRepository::list(&state.store),
        PropertyRepository::list_all(&state.store)
    );

    Json(
        categories
            .into_iter()
            .map(|category| {
                let count = count_for_category(&category, &properties);
                CategoryWithCount { category, count }
            })
            .collect(),
    )
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(body): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let created = CategoryRepository::create(&state.store, &body.name, body.icon).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    lang: Lang,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    CategoryRepository::delete(&state.store, id).await?;
    Ok(Json(json!({ "message": lang.t("category.deleted"), "id": id })))
}

async fn list_types(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let properties = PropertyRepository::list_all(&state.store).await;
    Json(distinct_types(&properties))
}

async fn list_locations(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let properties = PropertyRepository::list_all(&state.store).await;
    Json(distinct_locations(&properties))
}
