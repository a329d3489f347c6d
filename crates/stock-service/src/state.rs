use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::StockCache;
use crate::deduction::DeductionEngine;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: StockCache,
    pub engine: Arc<DeductionEngine>,
}
