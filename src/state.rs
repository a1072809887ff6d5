/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - drinks: DrinkRepo, guard: AccessGuard
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::DrinkRepo;
use crate::services::auth::AccessGuard;

#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepo>,
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkRepo>, guard: Arc<AccessGuard>) -> Self {
        Self { drinks, guard }
    }
}
