/*
 * Responsibility
 * - GET /health (DB 疎通 + pool 統計)
 * - DB が落ちていても 200 で status: "down" を返す
 */
use axum::{Json, extract::State};

use crate::{api::extractors::TenantCtxExtractor, services::HealthReport, state::AppState};

pub async fn health(
    State(state): State<AppState>,
    TenantCtxExtractor(ctx): TenantCtxExtractor,
) -> Json<HealthReport> {
    let report = state.db.health().await;

    tracing::debug!(
        tenant_id = %ctx.tenant_id,
        status = ?report.status,
        "health check"
    );

    Json(report)
}
