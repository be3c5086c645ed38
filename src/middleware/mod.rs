/*
 * Responsibility
 * - middleware の公開インターフェース
 * - cors::apply, http::apply, tenant::apply
 */
pub mod cors;
pub mod http;
pub mod tenant;
