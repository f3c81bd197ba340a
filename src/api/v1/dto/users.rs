/*
 * Responsibility
 * - Users の response DTO (password hash は載せない)
 */
use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;
use crate::repos::user_repo::{Role, UserRow};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
        }
    }
}

impl From<AuthCtx> for UserResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            id: ctx.user_id,
            email: ctx.email,
            first_name: ctx.first_name,
            last_name: ctx.last_name,
            role: ctx.role,
        }
    }
}
