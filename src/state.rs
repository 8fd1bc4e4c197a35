/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: 起動時に検証済みの AuthPipeline (不変)
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::services::auth::AuthPipeline;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthPipeline>,
}

impl AppState {
    pub fn new(auth: Arc<AuthPipeline>) -> Self {
        Self { auth }
    }
}
