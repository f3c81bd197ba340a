/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - bearer gate が users 行を解決し、middleware が request extensions に格納する
 *
 * Notes
 * - token 検証や users lookup は services::auth::gate の責務
 * - password hash はここには載せない
 */
use crate::repos::user_repo::{Role, UserRow};

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<UserRow> for AuthCtx {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
        }
    }
}
