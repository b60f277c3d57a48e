use axum::{
    extract::{DefaultBodyLimit, State},
    routing::post,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{auth::jwt::AuthUser, error::AppError, extract::Json, state::AppState};

use super::{
    dto::{ScanFoodRequest, ScanFoodResponse},
    services,
};

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/food-scan", post(scan_food))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, base64 photos
}

#[instrument(skip(state, body))]
pub async fn scan_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ScanFoodRequest>,
) -> Result<Json<ScanFoodResponse>, AppError> {
    let res = services::scan_food(&state, body)
        .await
        .inspect_err(|e| warn!(%user_id, error = %e, "food scan failed"))?;
    info!(%user_id, items = res.foods.len(), total_calories = res.total_calories, "food scanned");
    Ok(Json(res))
}
