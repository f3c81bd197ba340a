/*
 * Responsibility
 * - Bearer 認証の本体 (ヘッダ抽出 → token 検証 → users lookup)
 * - axum 非依存。middleware::auth::access がこれを呼び、結果を extensions に載せる
 * - 起動時に 1 度だけ組み立て、route 登録時に明示的に渡す
 */
use std::sync::Arc;

use axum::http::{HeaderMap, header};

use crate::error::{AppError, INVALID_CREDENTIALS, NOT_AUTHENTICATED, TOKEN_INVALID};
use crate::repos::user_repo::{UserRow, UserStore};
use crate::services::auth::token_codec::{TokenCodec, TokenError};

#[derive(Clone)]
pub struct BearerGate {
    tokens: Arc<TokenCodec>,
    users: Arc<dyn UserStore>,
}

impl BearerGate {
    pub fn new(tokens: Arc<TokenCodec>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Pull the credential out of `Authorization: <scheme> <credentials>`.
    ///
    /// - no header, or scheme/credentials missing: "Not authenticated"
    /// - scheme other than `Bearer` (case-insensitive): "Invalid authentication credentials"
    pub fn credentials(headers: &HeaderMap) -> Result<&str, AppError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Err(AppError::Unauthorized(NOT_AUTHENTICATED));
        };
        let value = value
            .to_str()
            .map_err(|_| AppError::Unauthorized(INVALID_CREDENTIALS))?;

        let (scheme, credentials) = value.split_once(' ').unwrap_or((value, ""));
        let credentials = credentials.trim();
        if scheme.is_empty() || credentials.is_empty() {
            return Err(AppError::Unauthorized(NOT_AUTHENTICATED));
        }
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
        }

        Ok(credentials)
    }

    /// Resolve the request's bearer token to a stored user.
    ///
    /// A token whose subject no longer matches a row fails closed with the
    /// same 401 as any other invalid token.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<UserRow, AppError> {
        let token = Self::credentials(headers)?;

        let claims = self.tokens.decode(token).map_err(|err| {
            match &err {
                TokenError::Expired => tracing::warn!("access token expired"),
                _ => tracing::warn!(error = %err, "access token verification failed"),
            }
            AppError::from(err)
        })?;

        match self.users.find_by_id(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = claims.sub, "token subject has no matching user");
                Err(AppError::Unauthorized(TOKEN_INVALID))
            }
        }
    }
}
