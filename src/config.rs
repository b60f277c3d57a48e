use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// OpenAI-compatible vision endpoint used by `/food-scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodScanConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub site_url: String,
    pub site_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// `None` when `OPENROUTER_API_KEY` is unset; scanning then fails upstream.
    pub food_scan: Option<FoodScanConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutritrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutritrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let food_scan = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| FoodScanConfig {
                api_key,
                base_url: std::env::var("FOOD_SCAN_BASE_URL")
                    .unwrap_or_else(|_| "https://openrouter.ai/api/v1".into()),
                model: std::env::var("FOOD_SCAN_MODEL")
                    .unwrap_or_else(|_| "openai/gpt-4o-mini".into()),
                site_url: std::env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:5173".into()),
                site_name: std::env::var("SITE_NAME").unwrap_or_else(|_| "NutriTrack".into()),
            });

        Ok(Self {
            database_url,
            jwt,
            food_scan,
        })
    }
}
