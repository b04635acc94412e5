//! Dashboard endpoints

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::handlers::AppState;
use crate::dashboard::{export, Snapshot};

/// GET /api/stats - Dashboard snapshot
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.dashboard.compute_snapshot().await)
}

/// GET /api/stats/export.csv - Daily series as a CSV download
pub async fn export_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.dashboard.compute_snapshot().await;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::file_name(Utc::now().date_naive())
    );

    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        export::to_csv(&snapshot.time_series),
    )
}
