//! bearer token 検証 → users 行を解決 → AuthCtx を extensions に入れる
//!
//! 検証そのもの (ヘッダ抽出, HS256 decode, users lookup) は `BearerGate` が持つ。
//! ここは axum との配線だけ。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::BearerGate;
use crate::state::AppState;

/// `router` の全 route に bearer 認証を掛ける。
///
/// gate は起動時に組み立てたものを明示的に渡す。
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.gate.clone());
/// ```
pub fn apply(router: Router<AppState>, gate: BearerGate) -> Router<AppState> {
    // route_layer: 存在しない path は 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<BearerGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = gate.authenticate(req.headers()).await?;

    // middleware → extractor への受け渡し (この request だけのスロット)
    req.extensions_mut().insert(AuthCtx::from(user));

    Ok(next.run(req).await)
}
