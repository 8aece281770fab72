use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{InquiryRepository, PropertyRepository, SubscriberRepository};
use crate::routes::auth::AuthUser;
use crate::services::dashboard::{
    chart_months, compute_chart, compute_stats, ChartPoint, DashboardStats,
};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(stats))
        .route("/chart", get(chart))
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub months: Option<u32>,
}

async fn stats(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
) -> Json<DashboardStats> {
    let (properties, inquiries, subscribers) = futures::join!(
        PropertyRepository::list_all(&state.store),
        InquiryRepository::list(&state.store, None),
        SubscriberRepository::count(&state.store),
    );
    Json(compute_stats(&properties, &inquiries, subscribers))
}

async fn chart(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<ChartQuery>,
) -> Json<Vec<ChartPoint>> {
    let (properties, inquiries) = futures::join!(
        PropertyRepository::list_all(&state.store),
        InquiryRepository::list(&state.store, None),
    );
    Json(compute_chart(
        &properties,
        &inquiries,
        chart_months(query.months),
        chrono::Utc::now(),
    ))
}
