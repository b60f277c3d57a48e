//! Food recognition through an OpenAI-compatible chat completions API
//! (OpenRouter by default). The model is asked for a strict JSON object and
//! its reply is parsed into [`FoodItem`]s.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{config::FoodScanConfig, error::AppError};

use super::dto::FoodItem;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f32 = 0.3;

const PROMPT: &str = r#"Analyze this food image and identify all food items and ingredients visible. For each food item, provide:
1. The name of the food/ingredient
2. Estimated quantity (e.g., "1 cup", "200g", "1 serving")
3. Calories
4. Protein in grams
5. Carbs in grams
6. Fats in grams

Return the response as a JSON object with this exact structure:
{
  "foods": [
    {
      "name": "food name",
      "quantity": "estimated quantity",
      "calories": number,
      "protein": number,
      "carbs": number,
      "fats": number
    }
  ]
}

Be as accurate as possible with the nutritional information. If you cannot identify a food item clearly, estimate based on common serving sizes. Return ONLY valid JSON, no additional text."#;

/// Turns an image (http(s) or `data:` URL) into estimated food items.
#[async_trait]
pub trait FoodRecognizer: Send + Sync {
    async fn recognize(&self, image_url: &str) -> Result<Vec<FoodItem>, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Shape the model is asked to produce. Numbers may come back missing or null.
#[derive(Debug, Deserialize)]
struct FoodReply {
    foods: Vec<RawFood>,
}

#[derive(Debug, Deserialize)]
struct RawFood {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    protein: Option<f64>,
    #[serde(default)]
    carbs: Option<f64>,
    #[serde(default)]
    fats: Option<f64>,
}

impl From<RawFood> for FoodItem {
    fn from(r: RawFood) -> Self {
        Self {
            name: r.name.unwrap_or_else(|| "Unknown food".into()),
            quantity: r.quantity,
            calories: r.calories.unwrap_or(0.0),
            protein: r.protein.unwrap_or(0.0),
            carbs: r.carbs.unwrap_or(0.0),
            fats: r.fats.unwrap_or(0.0),
        }
    }
}

/// Parses the model's reply. Falls back to the outermost `{...}` span when the
/// JSON is wrapped in prose or a markdown fence.
pub fn parse_food_reply(text: &str) -> Result<Vec<FoodItem>, AppError> {
    lazy_static! {
        static ref JSON_OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }

    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            let span = JSON_OBJECT
                .find(text)
                .ok_or_else(|| AppError::upstream("Failed to parse AI response as JSON"))?;
            serde_json::from_str(span.as_str())
                .map_err(|_| AppError::upstream("Failed to parse AI response as JSON"))?
        }
    };

    let reply: FoodReply = serde_json::from_value(value)
        .map_err(|_| AppError::upstream("Invalid response format from AI"))?;
    Ok(reply.foods.into_iter().map(FoodItem::from).collect())
}

pub struct OpenRouterRecognizer {
    client: Client,
    config: FoodScanConfig,
}

impl OpenRouterRecognizer {
    pub fn new(config: FoodScanConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        info!(base_url = %config.base_url, model = %config.model, "food recognizer ready");
        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl FoodRecognizer for OpenRouterRecognizer {
    async fn recognize(&self, image_url: &str) -> Result<Vec<FoodItem>, AppError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: PROMPT },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: TEMPERATURE,
        };

        debug!(model = %self.config.model, image_len = image_url.len(), "sending food scan request");
        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.site_name)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "food scan request failed");
                AppError::upstream(format!("Failed to reach food recognition service: {e}"))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::upstream(format!("Failed to read food recognition response: {e}"))
        })?;
        if !status.is_success() {
            let preview: String = text.chars().take(500).collect();
            error!(%status, body = %preview, "food scan returned error");
            return Err(AppError::upstream(format!(
                "Food recognition service returned {status}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::upstream(format!("Failed to parse AI response: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::upstream("No response from AI model"))?;

        parse_food_reply(&content)
    }
}
