use std::error::Error;
use std::sync::Arc;

use orders::cache::{Cache, RedisCache};
use orders::executable_utils::{initialize_executable, initialize_tracing, run_backend};
use orders::service::OrderService;
use orders::storage::{OrderStore, PgOrderStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);

    let store: Arc<dyn OrderStore> =
        Arc::new(PgOrderStore::connect(&config.common.database_url).await?);
    let cache: Arc<dyn Cache> = Arc::new(RedisCache::connect(&config.common.redis_url).await?);
    let service = Arc::new(OrderService::new(store, cache));

    run_backend(config.backend, service).await
}
