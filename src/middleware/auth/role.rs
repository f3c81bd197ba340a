//! Role gate: admin-only routes.

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::{AppError, NOT_AUTHENTICATED};
use crate::state::AppState;

/// Pass only when the resolved identity is an admin.
///
/// `None` means the bearer gate never ran for this request; that is reported
/// as 401 rather than as a missing-role 403.
pub fn require_admin(ctx: Option<&AuthCtx>) -> Result<(), AppError> {
    let ctx = ctx.ok_or(AppError::Unauthorized(NOT_AUTHENTICATED))?;
    if !ctx.is_admin() {
        tracing::warn!(user_id = ctx.user_id, "admin route denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Apply the admin check to every route of `router`.
///
/// Must end up inside `access::apply`, which inserts the `AuthCtx`.
pub fn apply(router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(require_admin_middleware))
}

async fn require_admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_admin(req.extensions().get::<AuthCtx>())?;
    Ok(next.run(req).await)
}
