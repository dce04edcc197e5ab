use axum::{extract::State, Json};
use postboard_instagram::{SystemClock, WeeklyPosts, WeeklyResult};

use super::AppState;

/// `GET /api/instagram/weekly-posts`. Always 200; failures are reported in
/// the body's `success` / `error` fields.
pub(super) async fn get_weekly_posts(State(state): State<AppState>) -> Json<WeeklyResult> {
    let result = WeeklyPosts::new(state.instagram.as_ref(), SystemClock)
        .get_weekly_posts()
        .await;
    Json(result)
}
