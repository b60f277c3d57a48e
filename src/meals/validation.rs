use uuid::Uuid;

use crate::{
    error::AppError,
    meals::{
        dto::{CreateMealLogRequest, UpdateMealLogRequest},
        repo_types::{MealLogPatch, NewMealLog},
    },
};

const ALL_FIELDS_REQUIRED: &str =
    "All fields (meal, calories, protein, carbs, fats, date) are required";
const NO_NEGATIVES: &str = "Calories, protein, carbs, and fats cannot be negative";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Turns a create request into a record owned by `owner`.
///
/// Checks run in a fixed order: missing fields, negative values, then the
/// caller identity. The owner always comes from `owner`, never from the body.
pub fn validate_new(
    req: CreateMealLogRequest,
    owner: Option<Uuid>,
) -> Result<NewMealLog, AppError> {
    let CreateMealLogRequest {
        meal,
        calories,
        protein,
        carbs,
        fats,
        date,
    } = req;

    let (Some(meal), Some(calories), Some(protein), Some(carbs), Some(fats), Some(date)) = (
        non_blank(meal),
        calories,
        protein,
        carbs,
        fats,
        non_blank(date),
    ) else {
        return Err(AppError::MissingField(ALL_FIELDS_REQUIRED.into()));
    };

    if [calories, protein, carbs, fats].iter().any(|v| *v < 0.0) {
        return Err(AppError::NegativeValue(NO_NEGATIVES.into()));
    }

    let user_id = owner.ok_or_else(|| AppError::unauthenticated("User not authenticated"))?;

    Ok(NewMealLog {
        user_id,
        meal,
        calories,
        protein,
        carbs,
        fats,
        date,
    })
}

fn check_non_negative(value: Option<f64>, label: &str) -> Result<Option<f64>, AppError> {
    match value {
        Some(v) if v < 0.0 => Err(AppError::NegativeValue(format!(
            "{label} cannot be negative"
        ))),
        other => Ok(other),
    }
}

fn check_present(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(s) => non_blank(Some(s))
            .map(Some)
            .ok_or_else(|| AppError::MissingField(format!("{field} cannot be empty"))),
    }
}

/// Validates only the fields present in an update.
pub fn validate_patch(req: UpdateMealLogRequest) -> Result<MealLogPatch, AppError> {
    Ok(MealLogPatch {
        calories: check_non_negative(req.calories, "Calories")?,
        protein: check_non_negative(req.protein, "Protein")?,
        carbs: check_non_negative(req.carbs, "Carbs")?,
        fats: check_non_negative(req.fats, "Fats")?,
        meal: check_present(req.meal, "meal")?,
        date: check_present(req.date, "date")?,
    })
}
