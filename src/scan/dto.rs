use serde::{Deserialize, Serialize};

use crate::meals::aggregate::{DailyTotals, Nutrients};

/// Body of `POST /food-scan`; one of the two images is required.
/// `image_base64` wins when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct ScanFoodRequest {
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Nutrients for FoodItem {
    fn nutrients(&self) -> DailyTotals {
        DailyTotals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanFoodResponse {
    pub foods: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
}
