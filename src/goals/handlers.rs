use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::AppError,
    extract::{lenient_number, Json},
    state::AppState,
};

use super::services;

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub calorie_goal: f64,
    pub is_default: bool,
}

/// `{"calorie_goal": 1800}` sets the goal, `{"calorie_goal": null}` resets it.
#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub calorie_goal: Option<f64>,
}

pub fn goal_routes() -> Router<AppState> {
    Router::new().route("/me/goal", get(get_goal).put(put_goal))
}

#[instrument(skip(state))]
pub async fn get_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GoalResponse>, AppError> {
    let configured = state.goals.get_goal(user_id).await?;
    Ok(Json(GoalResponse {
        calorie_goal: services::resolve_goal(configured),
        is_default: configured.is_none(),
    }))
}

#[instrument(skip(state))]
pub async fn put_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SetGoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let (calorie_goal, is_default) = services::set_goal(&state, user_id, body.calorie_goal).await?;
    info!(%user_id, calorie_goal, is_default, "calorie goal updated");
    Ok(Json(GoalResponse {
        calorie_goal,
        is_default,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        app::testing::{bearer, send},
        state::AppState,
    };

    #[tokio::test]
    async fn goal_routes_require_a_token() {
        let state = AppState::fake();
        for (method, body) in [("GET", None), ("PUT", Some(json!({ "calorie_goal": 1800 })))] {
            let (status, err) = send(&state, method, "/api/v1/me/goal", None, body).await;
            assert_eq!(status, 401, "{method}");
            assert_eq!(err["error"], "UNAUTHENTICATED");
        }
    }

    #[tokio::test]
    async fn set_then_reset_goal() {
        let state = AppState::fake();
        let auth = bearer(&state, Uuid::new_v4());

        let (status, goal) = send(&state, "GET", "/api/v1/me/goal", Some(auth.as_str()), None).await;
        assert_eq!(status, 200);
        assert_eq!(goal, json!({ "calorie_goal": 2000.0, "is_default": true }));

        let (status, goal) = send(
            &state,
            "PUT",
            "/api/v1/me/goal",
            Some(auth.as_str()),
            Some(json!({ "calorie_goal": 1800 })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(goal, json!({ "calorie_goal": 1800.0, "is_default": false }));

        let (_, goal) = send(&state, "GET", "/api/v1/me/goal", Some(auth.as_str()), None).await;
        assert_eq!(goal["calorie_goal"], 1800.0);

        let (status, goal) = send(
            &state,
            "PUT",
            "/api/v1/me/goal",
            Some(auth.as_str()),
            Some(json!({ "calorie_goal": null })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(goal, json!({ "calorie_goal": 2000.0, "is_default": true }));
    }

    #[tokio::test]
    async fn day_summary_follows_goal() {
        let state = AppState::fake();
        let auth = bearer(&state, Uuid::new_v4());
        send(
            &state,
            "PUT",
            "/api/v1/me/goal",
            Some(auth.as_str()),
            Some(json!({ "calorie_goal": 1000 })),
        )
        .await;
        send(
            &state,
            "POST",
            "/api/v1/meal-logs",
            Some(auth.as_str()),
            Some(json!({
                "meal": "Pasta", "calories": 750, "protein": 25, "carbs": 110,
                "fats": 20, "date": "2024-03-02"
            })),
        )
        .await;

        let (_, day) = send(
            &state,
            "GET",
            "/api/v1/meal-logs/date/2024-03-02",
            Some(auth.as_str()),
            None,
        )
        .await;
        assert_eq!(day["goal"], 1000.0);
        assert_eq!(day["progress_percent"], 75);
    }

    #[tokio::test]
    async fn non_numeric_goal_is_invalid_input() {
        let state = AppState::fake();
        let auth = bearer(&state, Uuid::new_v4());
        let (status, err) = send(
            &state,
            "PUT",
            "/api/v1/me/goal",
            Some(auth.as_str()),
            Some(json!({ "calorie_goal": "plenty" })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(err["error"], "INVALID_INPUT");
    }
}
