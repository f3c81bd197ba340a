//! In-memory `UserStore` for tests that should not need Postgres.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{NewUser, Role, UserRow, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    rows: RwLock<Vec<UserRow>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row with a fixed id, replacing any row that already has it.
    pub async fn seed(&self, id: i32, email: &str, password_hash: &str, role: Role) -> UserRow {
        let row = UserRow {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        };
        let mut rows = self.rows.write().await;
        rows.retain(|r| r.id != id);
        rows.push(row.clone());
        row
    }
}

#[async_trait]
impl UserStore for MemoryUserRepo {
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<UserRow>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.email == user.email) {
            return Err(RepoError::Conflict);
        }

        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let row = UserRow {
            id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }
}
