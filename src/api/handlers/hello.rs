/*
 * Responsibility
 * - GET / (疎通用)
 * - tenant middleware を通過したリクエストだけがここに来る
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn hello_world() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "Hello World"})))
}
