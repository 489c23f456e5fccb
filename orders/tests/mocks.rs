//! Hand-rolled test doubles for the store and cache seams.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use orders::cache::Cache;
use orders::error::{CacheError, StoreError};
use orders::model::{
    ModelId, NewOrder, OrderDetail, OrderItemDetail, OrderReceipt, OrderStatus, OrderSummary,
};
use orders::storage::OrderStore;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory cache double. Records TTLs so tests can assert the TTL
/// policy, and can be switched into a broken state to simulate an
/// outage.
#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, (String, u64)>>,
    broken: AtomicBool,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|(value, _)| value.clone())
    }

    pub fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), 0));
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.broken.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Cache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entry(key))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), ttl_secs));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct FakeProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

struct World {
    users: HashMap<ModelId, (String, String)>,
    products: HashMap<ModelId, FakeProduct>,
    orders: Vec<OrderDetail>,
    next_order_id: ModelId,
    next_item_id: ModelId,
    clock: DateTime<Utc>,
}

/// In-memory store double implementing the same semantics the
/// Postgres adapter promises: snapshot pricing, atomic creation,
/// created_at-descending listing, zero-row status updates. Call
/// counters let tests assert which operations hit the store.
pub struct FakeOrderStore {
    world: Mutex<World>,
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl FakeOrderStore {
    pub fn new() -> Self {
        Self {
            world: Mutex::new(World {
                users: HashMap::new(),
                products: HashMap::new(),
                orders: Vec::new(),
                next_order_id: 1,
                next_item_id: 1,
                clock: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            }),
            list_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// A store with one user and two products, matching the worked
    /// scenario: product 1 at 10.00, product 2 at 5.00.
    pub fn with_catalog() -> Self {
        let store = Self::new();
        store.add_user(1, "alice", "alice@example.com");
        store.add_product(1, "Widget", Some("A widget"), Decimal::new(1000, 2), 100);
        store.add_product(2, "Gadget", None, Decimal::new(500, 2), 50);
        store
    }

    pub fn add_user(&self, id: ModelId, username: &str, email: &str) {
        self.world
            .lock()
            .unwrap()
            .users
            .insert(id, (username.to_string(), email.to_string()));
    }

    pub fn add_product(
        &self,
        id: ModelId,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
    ) {
        self.world.lock().unwrap().products.insert(
            id,
            FakeProduct {
                name: name.to_string(),
                description: description.map(str::to_string),
                price,
                stock,
            },
        );
    }

    pub fn stock_of(&self, product_id: ModelId) -> Option<i32> {
        self.world
            .lock()
            .unwrap()
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    pub fn order_count(&self) -> usize {
        self.world.lock().unwrap().orders.len()
    }

    pub fn status_of(&self, order_id: ModelId) -> Option<OrderStatus> {
        self.world
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status)
    }

    /// Inserts an order directly, bypassing the trait, for read-path
    /// tests.
    pub fn seed_order(&self, user_id: ModelId, status: OrderStatus, total: Decimal) -> ModelId {
        let mut world = self.world.lock().unwrap();
        let (username, email) = world
            .users
            .get(&user_id)
            .cloned()
            .expect("seed_order requires a seeded user");
        world.clock += Duration::seconds(1);
        let id = world.next_order_id;
        world.next_order_id += 1;
        let now = world.clock;
        world.orders.push(OrderDetail {
            id,
            user_id,
            total_amount: total,
            status,
            shipping_address: None,
            created_at: now,
            updated_at: now,
            username,
            email,
            items: Vec::new(),
        });
        id
    }
}

impl Default for FakeOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(order: &OrderDetail) -> OrderSummary {
    OrderSummary {
        id: order.id,
        user_id: order.user_id,
        total_amount: order.total_amount,
        status: order.status,
        shipping_address: order.shipping_address.clone(),
        created_at: order.created_at,
        username: order.username.clone(),
    }
}

#[async_trait]
impl OrderStore for FakeOrderStore {
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let world = self.world.lock().unwrap();
        let mut summaries: Vec<OrderSummary> = world.orders.iter().map(summarize).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn fetch_order(&self, id: ModelId) -> Result<Option<OrderDetail>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let world = self.world.lock().unwrap();
        Ok(world.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<OrderReceipt, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut world = self.world.lock().unwrap();

        let (username, email) = world
            .users
            .get(&new_order.user_id)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("no such user".to_string()))?;

        // Price everything first so a missing product rolls the whole
        // creation back, as the transactional adapter does.
        let mut total_amount = Decimal::ZERO;
        let mut priced = Vec::new();
        for item in &new_order.items {
            let product = world
                .products
                .get(&item.product_id)
                .ok_or(StoreError::ProductNotFound(item.product_id))?;
            total_amount += product.price * Decimal::from(item.quantity);
            priced.push((
                item.product_id,
                item.quantity,
                product.price,
                product.name.clone(),
                product.description.clone(),
            ));
        }

        world.clock += Duration::seconds(1);
        let order_id = world.next_order_id;
        world.next_order_id += 1;
        let now = world.clock;

        let mut items = Vec::new();
        for (product_id, quantity, price, product_name, product_description) in priced {
            let item_id = world.next_item_id;
            world.next_item_id += 1;
            items.push(OrderItemDetail {
                id: item_id,
                product_id,
                quantity,
                price,
                product_name,
                product_description,
            });
            if let Some(product) = world.products.get_mut(&product_id) {
                product.stock -= quantity;
            }
        }

        world.orders.push(OrderDetail {
            id: order_id,
            user_id: new_order.user_id,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address: new_order.shipping_address.clone(),
            created_at: now,
            updated_at: now,
            username,
            email,
            items,
        });

        Ok(OrderReceipt {
            order_id,
            total_amount,
        })
    }

    async fn update_status(&self, id: ModelId, status: OrderStatus) -> Result<bool, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut world = self.world.lock().unwrap();
        world.clock += Duration::seconds(1);
        let now = world.clock;
        match world.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
