use crate::{error::AppError, meals::aggregate::daily_totals, state::AppState};

use super::dto::{ScanFoodRequest, ScanFoodResponse};

/// Picks the image to send upstream. Bare base64 is assumed to be JPEG.
pub fn image_url_for(req: &ScanFoodRequest) -> Result<String, AppError> {
    let base64 = req.image_base64.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let url = req.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty());

    match (base64, url) {
        (Some(b64), _) if b64.starts_with("data:") => Ok(b64.to_owned()),
        (Some(b64), _) => Ok(format!("data:image/jpeg;base64,{b64}")),
        (None, Some(url)) => Ok(url.to_owned()),
        (None, None) => Err(AppError::InvalidInput(
            "Either image_url or image_base64 is required".into(),
        )),
    }
}

pub async fn scan_food(st: &AppState, req: ScanFoodRequest) -> Result<ScanFoodResponse, AppError> {
    let image_url = image_url_for(&req)?;
    let recognizer = st
        .food_scanner
        .as_ref()
        .ok_or_else(|| AppError::upstream("Food recognition is not configured"))?;

    let foods = recognizer.recognize(&image_url).await?;
    let totals = daily_totals(&foods);

    Ok(ScanFoodResponse {
        foods,
        total_calories: totals.calories,
        total_protein: totals.protein,
        total_carbs: totals.carbs,
        total_fats: totals.fats,
    })
}
