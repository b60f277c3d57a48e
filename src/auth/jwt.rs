use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
    error::AppError,
    state::AppState,
};

/// Signing material derived once from `JwtConfig` and shared through `AppState`.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[cfg.issuer.as_str()]);
        validation.set_audience(&[cfg.audience.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%user_id, ?kind, "token issued");
        Ok(token)
    }

    /// Decodes `token` and insists it was issued as `expected`.
    pub fn decode_as(&self, token: &str, expected: TokenKind) -> anyhow::Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;
        anyhow::ensure!(
            claims.kind == expected,
            "expected {expected:?} token, got {:?}",
            claims.kind
        );
        Ok(claims)
    }
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

/// Caller identity taken from a valid access token. Handlers pass the inner
/// id explicitly into every service call.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthenticated("Not authorized, no token"))?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| AppError::unauthenticated("Not authorized, no token"))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = Arc::<JwtKeys>::from_ref(state)
            .decode_as(token, TokenKind::Access)
            .map_err(|e| {
                warn!(error = %e, "rejected bearer token");
                AppError::unauthenticated("Not authorized, token failed")
            })?;
        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn keys(issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "shared-secret".into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header("authorization", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn access_token_carries_identity_and_audience() {
        let keys = keys("nutritrack", "nutritrack-users");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, TokenKind::Access).unwrap();
        let claims = keys.decode_as(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "nutritrack");
        assert_eq!(claims.aud, "nutritrack-users");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let keys = keys("iss", "aud");
        let user_id = Uuid::new_v4();
        let refresh = keys.issue(user_id, TokenKind::Refresh).unwrap();
        let access = keys.issue(user_id, TokenKind::Access).unwrap();

        assert_eq!(keys.decode_as(&refresh, TokenKind::Refresh).unwrap().sub, user_id);
        assert!(keys.decode_as(&refresh, TokenKind::Access).is_err());
        assert!(keys.decode_as(&access, TokenKind::Refresh).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let token = keys("good-iss", "good-aud")
            .issue(Uuid::new_v4(), TokenKind::Access)
            .unwrap();
        assert!(keys("bad-iss", "good-aud")
            .decode_as(&token, TokenKind::Access)
            .is_err());
        assert!(keys("good-iss", "bad-aud")
            .decode_as(&token, TokenKind::Access)
            .is_err());
    }

    #[tokio::test]
    async fn extractor_yields_caller_id() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = state.jwt.issue(user_id, TokenKind::Access).unwrap();
        let AuthUser(id) = extract(&state, Some(format!("Bearer {token}").as_str()))
            .await
            .expect("authenticated");
        assert_eq!(id, user_id);
    }

    #[tokio::test]
    async fn extractor_rejects_missing_bad_and_refresh_tokens() {
        let state = AppState::fake();
        let refresh = state.jwt.issue(Uuid::new_v4(), TokenKind::Refresh).unwrap();

        for header in [
            None,
            Some("Token abc".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {refresh}")),
        ] {
            let err = extract(&state, header.as_deref()).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated(_)), "{header:?}");
        }
    }
}
