use std::sync::Arc;

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, Role, UserStore};
use crate::services::auth::TokenCodec;
use crate::services::password::{hash_password, verify_password};

const WRONG_CREDENTIALS: &str = "Wrong email or password";

/// Registration and login: both end by minting an access token.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenCodec>,
    bcrypt_cost: u32,
}

/// Input for `AccountService::register`, already validated by the handler.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenCodec>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    /// Store a new `user`-role account and return a token for it.
    pub async fn register(&self, reg: Registration) -> Result<String, AppError> {
        let password_hash = hash_password(reg.password, self.bcrypt_cost).await?;

        let user = self
            .users
            .create(NewUser {
                email: reg.email.trim().to_string(),
                password_hash,
                first_name: reg.first_name,
                last_name: reg.last_name,
                role: Role::default(),
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::Conflict("User with this email already exists"),
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(self.tokens.encode(user.id)?)
    }

    /// Check the credentials and return a fresh token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: String) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            return Err(AppError::invalid_request(WRONG_CREDENTIALS));
        };

        if !verify_password(password, user.password_hash).await? {
            tracing::warn!(user_id = user.id, "login with wrong password");
            return Err(AppError::invalid_request(WRONG_CREDENTIALS));
        }

        Ok(self.tokens.encode(user.id)?)
    }
}
