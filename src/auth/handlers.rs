use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MeResponse, MessageResponse,
            PublicUser, RefreshRequest, RegisterRequest,
        },
        claims::TokenKind,
        jwt::AuthUser,
        password::{hash_password, is_valid_email, verify_password, MIN_PASSWORD_LEN},
        repo_types::User,
    },
    error::AppError,
    extract::Json,
    goals::services::resolve_goal,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).delete(delete_me))
        .route("/me/password", patch(change_password))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let sign = |kind| {
        state.jwt.issue(user.id, kind).map_err(|e| {
            error!(error = %e, ?kind, "token signing failed");
            AppError::internal(e.to_string())
        })
    };
    let access_token = sign(TokenKind::Access)?;
    let refresh_token = sign(TokenKind::Refresh)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    })
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::InvalidInput("Invalid email".into()));
    }
    Ok(email)
}

fn normalize_username(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|u| !u.is_empty())
}

/// Checks the request shape; returns the current and new passwords.
fn new_password_from(req: &ChangePasswordRequest) -> Result<(&str, &str), AppError> {
    let (Some(current), Some(new)) = (
        req.current_password.as_deref().filter(|p| !p.is_empty()),
        req.new_password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::InvalidInput(
            "Please provide both current password and new password".into(),
        ));
    };
    if new.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok((current, new))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email)?;

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::InvalidInput("Password too short".into()));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(|e| AppError::internal(e.to_string()))?;
    let username = normalize_username(payload.username.as_deref());
    let user = User::create(&state.db, &email, username, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email)?;

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthenticated("Invalid email or password"));
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(e.to_string()))?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthenticated("Invalid email or password"));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let claims = state
        .jwt
        .decode_as(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::unauthenticated("Invalid refresh token")
        })?;

    let user = find_user(&state, claims.sub).await?;
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = find_user(&state, user_id).await?;
    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        username: user.username,
        calorie_goal: resolve_goal(user.calorie_goal),
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (current, new) = new_password_from(&payload)?;
    let user = find_user(&state, user_id).await?;

    let ok = verify_password(current, &user.password_hash)
        .map_err(|e| AppError::internal(e.to_string()))?;
    if !ok {
        warn!(%user_id, "change password with wrong current password");
        return Err(AppError::unauthenticated("Current password is incorrect"));
    }

    let hash = hash_password(new).map_err(|e| AppError::internal(e.to_string()))?;
    if !User::update_password(&state.db, user_id, &hash).await? {
        return Err(AppError::unauthenticated("User not found"));
    }

    info!(%user_id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(AppError::unauthenticated("User not found"));
    }
    info!(%user_id, "account deleted");
    Ok(Json(MessageResponse {
        message: "Account deleted successfully",
    }))
}

async fn find_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        error!(user_id = %user_id, "user not found");
        AppError::unauthenticated("User not found")
    })
}
