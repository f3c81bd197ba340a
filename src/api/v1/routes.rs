/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開: /health, /register, /login
 * - bearer gate: /users/me
 * - bearer gate + role gate (admin): /users
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{login, register},
    health::health,
    users::{list_users, me},
};
use crate::middleware::auth::{access, role};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = role::apply(Router::new().route("/users", get(list_users)));

    // layer は後から掛けたものが外側: access → role → handler の順に走る
    let protected = access::apply(
        Router::new().route("/users/me", get(me)).merge(admin),
        state.gate.clone(),
    );

    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}
