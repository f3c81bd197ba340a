/*
 * Responsibility
 * - GET /users/me : 認証済みなら誰でも
 * - GET /users    : admin のみ (role gate は routes 側で layer)
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::users::UserResponse;
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::state::AppState;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<UserResponse> {
    Json(ctx.into())
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = state.users.list().await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}
