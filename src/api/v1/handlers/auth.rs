/*
 * Responsibility
 * - POST /register, POST /login
 * - DTO validation → AccountService → { "token": ... }
 * - 返した token は保護 route に Bearer として毎回付けてもらう
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::v1::dto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::services::account::Registration;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let token = state
        .accounts
        .register(Registration {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate().map_err(AppError::invalid_request)?;

    let token = state.accounts.login(&req.email, req.password).await?;

    Ok(Json(TokenResponse { token }))
}
