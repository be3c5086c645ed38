/*
 * Responsibility
 * - アプリ共通の AppError 定義 (起動失敗 / 内部エラー)
 * - tenant 解決失敗 (TenantError) の定義
 * - IntoResponse 実装 (HTTP status / body)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Config / Server は起動時にしか出ないが、出た場合も詳細はクライアントに返さない
        tracing::error!(error = %self, "request failed");

        let body = ErrorResponse {
            error: ErrorBody {
                code: "INTERNAL_SERVER_ERROR",
                message: "internal server error".into(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Why a request could not be bound to a tenant.
///
/// Both variants are client errors; the distinction only changes the message.
/// Rendered as a plain-text body, not the JSON envelope of `AppError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TenantError {
    /// Loopback host, or a host with no label beyond `domain.tld`.
    #[error("Tenant ID is required in subdomain")]
    MissingSubdomain,
    /// A subdomain position exists but the label is empty (`.app.localhost`).
    #[error("Tenant ID is required")]
    EmptyTenantId,
}

impl TenantError {
    pub fn message(&self) -> &'static str {
        match self {
            TenantError::MissingSubdomain => "Tenant ID is required in subdomain",
            TenantError::EmptyTenantId => "Tenant ID is required",
        }
    }
}

impl IntoResponse for TenantError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;

    use super::*;

    #[tokio::test]
    async fn tenant_error_renders_plain_text_400() {
        let res = TenantError::MissingSubdomain.into_response();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Tenant ID is required in subdomain");
    }

    #[test]
    fn tenant_error_display_matches_body() {
        for err in [TenantError::MissingSubdomain, TenantError::EmptyTenantId] {
            assert_eq!(err.to_string(), err.message());
        }
    }

    #[tokio::test]
    async fn app_error_hides_details() {
        let res = AppError::Config(ConfigError::Missing("DB_HOST")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert!(!json.to_string().contains("DB_HOST"));
    }
}
