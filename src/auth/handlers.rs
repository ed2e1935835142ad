use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_against_dummy, verify_password},
        repo_types::NewUser,
    },
    error::{AppError, AppResult},
    state::AppState,
    storage::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(payload) = payload?;
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }

    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::DuplicateUser);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = match state
        .store
        .insert_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Duplicate(email)) => {
            warn!(%email, "email registered concurrently");
            return Err(AppError::DuplicateUser);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("email and password are required"));
    }

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        verify_against_dummy(&payload.password);
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(&user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        token,
    }))
}
