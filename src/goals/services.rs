use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Daily calorie target used when the user has not configured one.
pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

pub fn resolve_goal(configured: Option<f64>) -> f64 {
    configured.unwrap_or(DEFAULT_CALORIE_GOAL)
}

/// The goal in force for `user_id`.
pub async fn effective_goal(st: &AppState, user_id: Uuid) -> Result<f64, AppError> {
    let configured = st.goals.get_goal(user_id).await?;
    Ok(resolve_goal(configured))
}

/// Stores a new goal (or clears it with `None`) and returns the effective one
/// plus whether it is the default.
pub async fn set_goal(
    st: &AppState,
    user_id: Uuid,
    goal: Option<f64>,
) -> Result<(f64, bool), AppError> {
    if !st.goals.set_goal(user_id, goal).await? {
        warn!(%user_id, "calorie goal for unknown user");
        return Err(AppError::unauthenticated("User not found"));
    }
    Ok((resolve_goal(goal), goal.is_none()))
}
