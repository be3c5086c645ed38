/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: DatabaseService (tenant middleware / health handler が利用)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::DatabaseService;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }
}
