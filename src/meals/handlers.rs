use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{auth::jwt::AuthUser, error::AppError, extract::Json, state::AppState};

use super::{
    dto::{
        CreateMealLogRequest, DaySummary, MealLogEnvelope, MealLogList, MessageResponse,
        UpdateMealLogRequest,
    },
    repo_types::MealLog,
    services,
};

pub fn meal_log_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-logs", get(list_meal_logs).post(create_meal_log))
        .route("/meal-logs/date/:date", get(meal_logs_by_date))
        .route(
            "/meal-logs/:id",
            get(get_meal_log)
                .patch(update_meal_log)
                .delete(delete_meal_log),
        )
}

#[instrument(skip(state, body))]
pub async fn create_meal_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateMealLogRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealLogEnvelope>), AppError> {
    let meal_log = services::create_log(&state, Some(user_id), body)
        .await
        .inspect_err(|e| warn!(%user_id, error = %e, "meal log rejected"))?;

    info!(%user_id, id = %meal_log.id, date = %meal_log.date, "meal log created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meal-logs/{}", meal_log.id)) {
        headers.insert(header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(MealLogEnvelope {
            message: "Meal log added successfully",
            meal_log,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_meal_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MealLogList>, AppError> {
    let meals = services::list_logs(&state, user_id).await?;
    Ok(Json(MealLogList { meals }))
}

#[instrument(skip(state))]
pub async fn meal_logs_by_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DaySummary>, AppError> {
    let summary = services::day_summary(&state, user_id, &date).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn get_meal_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MealLog>, AppError> {
    let id = services::parse_log_id(&id)?;
    let log = services::get_log(&state, user_id, id).await?;
    Ok(Json(log))
}

#[instrument(skip(state, body))]
pub async fn update_meal_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateMealLogRequest>,
) -> Result<Json<MealLogEnvelope>, AppError> {
    let id = services::parse_log_id(&id)?;
    let meal_log = services::update_log(&state, user_id, id, body)
        .await
        .inspect_err(|e| warn!(%user_id, %id, error = %e, "meal log update rejected"))?;

    info!(%user_id, %id, "meal log updated");
    Ok(Json(MealLogEnvelope {
        message: "Meal log updated successfully",
        meal_log,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = services::parse_log_id(&id)?;
    services::delete_log(&state, user_id, id).await?;

    info!(%user_id, %id, "meal log deleted");
    Ok(Json(MessageResponse {
        message: "Meal log deleted successfully",
    }))
}
