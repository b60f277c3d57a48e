use uuid::Uuid;

use crate::{
    error::AppError,
    goals::services::effective_goal,
    meals::{
        aggregate::{daily_totals, is_within_healthy_range, progress_percent, total_calories},
        dto::{CreateMealLogRequest, DaySummary, UpdateMealLogRequest},
        repo_types::MealLog,
        validation::{validate_new, validate_patch},
    },
    state::AppState,
};

const NOT_FOUND: &str = "Meal log not found";

/// Malformed ids are reported exactly like unknown ones.
pub fn parse_log_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(NOT_FOUND))
}

pub async fn create_log(
    st: &AppState,
    owner: Option<Uuid>,
    req: CreateMealLogRequest,
) -> Result<MealLog, AppError> {
    let new_log = validate_new(req, owner)?;
    Ok(st.meal_logs.create(new_log).await?)
}

pub async fn list_logs(st: &AppState, owner: Uuid) -> Result<Vec<MealLog>, AppError> {
    Ok(st.meal_logs.list_by_owner(owner).await?)
}

/// Meals for one calendar day plus totals against the caller's goal.
pub async fn day_summary(st: &AppState, owner: Uuid, date: &str) -> Result<DaySummary, AppError> {
    let meals = st.meal_logs.list_by_owner_and_date(owner, date).await?;
    let goal = effective_goal(st, owner).await?;
    let consumed = total_calories(&meals);
    let totals = daily_totals(&meals);

    Ok(DaySummary {
        date: date.to_owned(),
        progress_percent: progress_percent(consumed, goal),
        within_healthy_range: is_within_healthy_range(consumed),
        meals,
        totals,
        goal,
    })
}

pub async fn get_log(st: &AppState, owner: Uuid, id: Uuid) -> Result<MealLog, AppError> {
    st.meal_logs
        .get(owner, id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Ownership is checked before the patch, so a foreign id never reveals
/// anything through a validation error.
pub async fn update_log(
    st: &AppState,
    owner: Uuid,
    id: Uuid,
    req: UpdateMealLogRequest,
) -> Result<MealLog, AppError> {
    get_log(st, owner, id).await?;
    let patch = validate_patch(req)?;
    st.meal_logs
        .update(owner, id, patch)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

pub async fn delete_log(st: &AppState, owner: Uuid, id: Uuid) -> Result<(), AppError> {
    if st.meal_logs.delete(owner, id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(NOT_FOUND))
    }
}
