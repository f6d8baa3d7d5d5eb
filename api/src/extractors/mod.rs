/*!
 * Request extractors
 *
 * Public API:
 * - Principal: 認証済み主体 (bearer token の検証結果)
 */

mod principal;

pub use principal::Principal;
