use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::TenantCtx;

/// Handler で、 TenantCtx を受け取るための extractor
/// tenant middleware が TenantCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は middleware の配線ミスなので 500 を返す
pub struct TenantCtxExtractor(pub TenantCtx);

impl<S> FromRequestParts<S> for TenantCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantCtx>()
            .cloned()
            .map(TenantCtxExtractor)
            .ok_or(AppError::Internal)
    }
}
