pub mod tenant_ctx;

pub use tenant_ctx::{TenantCtx, TenantCtxExtractor, TenantId};
