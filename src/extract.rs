use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// `axum::Json` whose rejections come back as `AppError` bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
}

/// Accepts `300`, `"300"` or `" 300 "`. `null` and blank strings are absent.
pub fn lenient_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(d)? {
        None => Ok(None),
        Some(Loose::Number(n)) => Ok(Some(n)),
        Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Loose::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}

/// Accepts strings as-is and numbers in their decimal form, so `20240115`
/// becomes `"20240115"`.
pub fn lenient_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(d)? {
        None => None,
        Some(Loose::Text(s)) => Some(s),
        Some(Loose::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", n as i64)),
        Some(Loose::Number(n)) => Some(n.to_string()),
    })
}
