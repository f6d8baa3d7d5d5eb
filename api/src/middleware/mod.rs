/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (bearer), cors, http (request id / trace / limit / timeout / panic)
 */
pub mod auth;
pub mod cors;
pub mod http;
