use serde::{Deserialize, Serialize};

use crate::{
    extract::{lenient_number, lenient_text},
    meals::{aggregate::DailyTotals, repo_types::MealLog},
};

/// Body of `POST /meal-logs`. Every field is optional here so that absence
/// can be told apart from zero; unknown fields such as `user_id` are ignored.
/// Numbers may also be sent as numeric strings.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMealLogRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub meal: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fats: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
}

/// Body of `PATCH /meal-logs/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealLogRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub meal: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fats: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealLogEnvelope {
    pub message: &'static str,
    pub meal_log: MealLog,
}

#[derive(Debug, Serialize)]
pub struct MealLogList {
    pub meals: Vec<MealLog>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Everything the dashboard needs for one calendar day.
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub meals: Vec<MealLog>,
    pub totals: DailyTotals,
    pub goal: f64,
    pub progress_percent: i64,
    pub within_healthy_range: bool,
}
