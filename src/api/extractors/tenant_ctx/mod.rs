/*!
 * Tenant context extractor
 *
 * Responsibility:
 * - tenant middleware が解決したテナント（TenantCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - TenantId
 * - TenantCtx
 * - TenantCtxExtractor
 */

mod core;
mod types;

pub use core::TenantCtxExtractor;
pub use types::{TenantCtx, TenantId};
