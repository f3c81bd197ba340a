/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (bearer gate / role gate), cors, http (request id, trace, limits)
 */
pub mod auth;
pub mod cors;
pub mod http;
