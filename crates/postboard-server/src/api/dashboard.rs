use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use postboard_supabase::{DashboardStatistics, SupabaseError};
use serde::Serialize;

use super::AppState;
use crate::middleware::extract_bearer_token;

#[derive(Debug, Serialize)]
pub(super) struct StatisticsResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<DashboardStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StatisticsResponse {
    fn success(statistics: DashboardStatistics) -> Self {
        Self {
            success: true,
            statistics: Some(statistics),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            statistics: None,
            error: Some(error.into()),
        }
    }
}

/// `GET /api/dashboard/statistics`.
///
/// A missing or malformed bearer header is the only 401. Once a token is
/// present every collaborator failure comes back as 200 with
/// `success: false`.
pub(super) async fn get_dashboard_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = extract_bearer_token(headers.get(AUTHORIZATION)) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(StatisticsResponse::failure("Invalid authorization header")),
        )
            .into_response();
    };

    match load_statistics(&state, token).await {
        Ok(statistics) => Json(StatisticsResponse::success(statistics)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error getting dashboard statistics");
            Json(StatisticsResponse::failure(e.to_string())).into_response()
        }
    }
}

async fn load_statistics(
    state: &AppState,
    token: &str,
) -> Result<DashboardStatistics, SupabaseError> {
    let supabase = state
        .supabase
        .as_deref()
        .ok_or(SupabaseError::NotConfigured)?;
    let user = supabase.get_current_user(token).await?;
    supabase.get_dashboard_statistics(&user.id).await
}
