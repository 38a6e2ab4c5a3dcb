use std::sync::Arc;

use sqlx::PgPool;

use rota_assistant::Assistant;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub assistant: Arc<Assistant>,
}
