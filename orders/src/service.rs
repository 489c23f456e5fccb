use crate::cache::{
    Cache, ORDER_DETAIL_TTL_SECS, ORDERS_LIST_KEY, ORDERS_LIST_TTL_SECS, order_key,
};
use crate::error::{ServiceError, StoreError};
use crate::model::{
    CreateOrderRequest, ModelId, NewOrder, OrderDetail, OrderReceipt, OrderStatus, OrderSummary,
};
use crate::storage::OrderStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

/// A read result together with its provenance, serialized verbatim as
/// the response body.
#[derive(Debug, Clone, Serialize)]
pub struct Fetched<T> {
    pub source: Source,
    pub data: T,
}

/// Cache-aside orchestrator. Every read is either a fresh cache hit
/// or a store read that repopulates the cache; every write mutates
/// the store first and then invalidates the affected entries.
///
/// Cache failures are degraded, never fatal: a failing read counts as
/// a miss, a failing write or invalidation is logged and the request
/// proceeds (staleness stays bounded by the entry's TTL).
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    cache: Arc<dyn Cache>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    pub async fn list_orders(&self) -> Result<Fetched<Vec<OrderSummary>>, ServiceError> {
        if let Some(data) = self.cached(ORDERS_LIST_KEY).await {
            return Ok(Fetched {
                source: Source::Cache,
                data,
            });
        }

        let data = self.store.list_orders().await?;
        self.populate(ORDERS_LIST_KEY, &data, ORDERS_LIST_TTL_SECS)
            .await;
        Ok(Fetched {
            source: Source::Database,
            data,
        })
    }

    pub async fn get_order(&self, id: ModelId) -> Result<Fetched<OrderDetail>, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::NotFound);
        }

        let key = order_key(id);
        if let Some(data) = self.cached(&key).await {
            return Ok(Fetched {
                source: Source::Cache,
                data,
            });
        }

        // Negative results are never cached.
        let data = self
            .store
            .fetch_order(id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        self.populate(&key, &data, ORDER_DETAIL_TTL_SECS).await;
        Ok(Fetched {
            source: Source::Database,
            data,
        })
    }

    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderReceipt, ServiceError> {
        let new_order = validate_create(request)?;

        let receipt = self.store.create_order(&new_order).await.map_err(|e| match e {
            StoreError::ProductNotFound(id) => {
                ServiceError::Validation(format!("Unknown product: {id}"))
            }
            other => ServiceError::Store(other),
        })?;

        // The new order must not be hidden by a stale cached list. No
        // order:{id} entry exists yet for a fresh id, so only the
        // collection key is touched.
        self.invalidate(&[ORDERS_LIST_KEY]).await;
        Ok(receipt)
    }

    pub async fn update_order_status(
        &self,
        id: ModelId,
        status: &str,
    ) -> Result<(), ServiceError> {
        // Rejected before any store call.
        let status: OrderStatus = status
            .parse()
            .map_err(|_| ServiceError::Validation("Invalid status".to_string()))?;

        if id <= 0 || !self.store.update_status(id, status).await? {
            return Err(ServiceError::NotFound);
        }

        // Status shows in the single-order view and may show in the
        // list view; invalidate both.
        let key = order_key(id);
        self.invalidate(&[&key, ORDERS_LIST_KEY]).await;
        Ok(())
    }

    /// Cache read degraded to a miss on any failure, including an
    /// entry that no longer deserializes into the current shape.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, falling back to database");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(data) => {
                debug!(key, "Cache hit");
                Some(data)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Best-effort repopulation after a store read.
    async fn populate<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.cache.set_with_ttl(key, &raw, ttl_secs).await {
            warn!(key, error = %e, "Failed to populate cache");
        }
    }

    /// Best-effort invalidation after a committed store write. On
    /// failure the entry can serve stale data until its TTL expires.
    async fn invalidate(&self, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.cache.delete(key).await {
                warn!(key, error = %e, "Failed to invalidate cache entry");
            }
        }
    }
}

fn validate_create(request: CreateOrderRequest) -> Result<NewOrder, ServiceError> {
    let user_id = match request.user_id {
        Some(id) if id > 0 => id,
        _ => return Err(ServiceError::Validation("Missing required fields".to_string())),
    };
    if request.items.is_empty() {
        return Err(ServiceError::Validation("Missing required fields".to_string()));
    }
    for item in &request.items {
        if item.product_id <= 0 {
            return Err(ServiceError::Validation(format!(
                "Invalid product id: {}",
                item.product_id
            )));
        }
        if item.quantity <= 0 {
            return Err(ServiceError::Validation(format!(
                "Item quantity must be positive, got {}",
                item.quantity
            )));
        }
    }
    Ok(NewOrder {
        user_id,
        items: request.items,
        shipping_address: request.shipping_address,
    })
}
