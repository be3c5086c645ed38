/*
 * Responsibility
 * - URL 構造を定義
 * - tenant middleware は app.rs 側で routes() 全体に掛ける
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::handlers::{health::health, hello::hello_world};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(hello_world))
        .route("/health", get(health))
}
