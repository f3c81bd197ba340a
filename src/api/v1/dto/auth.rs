/*
 * Responsibility
 * - register / login の request/response DTO
 * - validate() で形式チェック (長さは users テーブルの列幅に合わせる)
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.first_name.trim().is_empty() || self.first_name.chars().count() > 30 {
            return Err("first_name must be 1..=30 chars");
        }
        if self.last_name.trim().is_empty() || self.last_name.chars().count() > 50 {
            return Err("last_name must be 1..=50 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.chars().count() > 120 {
        return Err("email must be <= 120 chars");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("email is invalid"),
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
