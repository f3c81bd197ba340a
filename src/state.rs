/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - users: UserStore, gate: BearerGate, accounts: AccountService
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動後は読み取り専用。request 間で共有される可変状態は持たない
 */
use std::sync::Arc;

use crate::repos::user_repo::UserStore;
use crate::services::account::AccountService;
use crate::services::auth::{BearerGate, TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub gate: BearerGate,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenCodec>, bcrypt_cost: u32) -> Self {
        Self {
            gate: BearerGate::new(tokens.clone(), users.clone()),
            accounts: AccountService::new(users.clone(), tokens, bcrypt_cost),
            users,
        }
    }
}
