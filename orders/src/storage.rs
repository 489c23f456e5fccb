use crate::error::StoreError;
use crate::model::{
    ModelId, NewOrder, OrderDetail, OrderItemDetail, OrderReceipt, OrderStatus, OrderSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::{debug, info};

/// Relational store seam. The orchestrator only ever talks to this
/// trait, so tests can substitute an in-memory implementation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders joined with the ordering user, most recent first.
    /// The created_at-descending ordering is a contract, not
    /// incidental.
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError>;

    /// Single-order composite with line items, or None if absent.
    async fn fetch_order(&self, id: ModelId) -> Result<Option<OrderDetail>, StoreError>;

    /// Creates the order, its items, and the stock decrements as one
    /// atomic unit. Prices are snapshotted from the products table
    /// inside the same transaction.
    async fn create_order(&self, new_order: &NewOrder) -> Result<OrderReceipt, StoreError>;

    /// Sets status and refreshes updated_at. Returns false when no
    /// row matched.
    async fn update_status(&self, id: ModelId, status: OrderStatus) -> Result<bool, StoreError>;
}

pub struct PgOrderStore {
    pool: sqlx::PgPool,
}

impl PgOrderStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = sqlx::PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OrderSummaryRow {
    id: i64,
    user_id: i64,
    total_amount: Decimal,
    status: String,
    shipping_address: Option<String>,
    created_at: DateTime<Utc>,
    username: String,
}

#[derive(FromRow)]
struct OrderDetailRow {
    id: i64,
    user_id: i64,
    total_amount: Decimal,
    status: String,
    shipping_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
    email: String,
}

#[derive(FromRow)]
struct OrderItemRow {
    id: i64,
    product_id: i64,
    quantity: i32,
    price: Decimal,
    product_name: String,
    product_description: Option<String>,
}

fn parse_status(raw: &str, order_id: ModelId) -> Result<OrderStatus, StoreError> {
    raw.parse().map_err(|_| {
        StoreError::InvalidRow(format!("order {order_id} has unrecognized status '{raw}'"))
    })
}

impl TryFrom<OrderSummaryRow> for OrderSummary {
    type Error = StoreError;

    fn try_from(row: OrderSummaryRow) -> Result<Self, StoreError> {
        let status = parse_status(&row.status, row.id)?;
        Ok(OrderSummary {
            id: row.id,
            user_id: row.user_id,
            total_amount: row.total_amount,
            status,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
            username: row.username,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError> {
        debug!("Listing all orders from database");
        let rows: Vec<OrderSummaryRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.status,
                   o.shipping_address, o.created_at, u.username
            FROM orders o
            JOIN users u ON o.user_id = u.id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderSummary::try_from).collect()
    }

    async fn fetch_order(&self, id: ModelId) -> Result<Option<OrderDetail>, StoreError> {
        debug!("Fetching order {} from database", id);
        let row: Option<OrderDetailRow> = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.status,
                   o.shipping_address, o.created_at, o.updated_at,
                   u.username, u.email
            FROM orders o
            JOIN users u ON o.user_id = u.id
            WHERE o.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT oi.id, oi.product_id, oi.quantity, oi.price,
                   p.name AS product_name, p.description AS product_description
            FROM order_items oi
            JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let status = parse_status(&row.status, row.id)?;
        let items = item_rows
            .into_iter()
            .map(|item| OrderItemDetail {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                product_name: item.product_name,
                product_description: item.product_description,
            })
            .collect();

        Ok(Some(OrderDetail {
            id: row.id,
            user_id: row.user_id,
            total_amount: row.total_amount,
            status,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
            username: row.username,
            email: row.email,
            items,
        }))
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<OrderReceipt, StoreError> {
        debug!(
            "Creating order for user {} with {} items",
            new_order.user_id,
            new_order.items.len()
        );

        let mut tx = self.pool.begin().await?;

        // Snapshot prices inside the transaction; the client never
        // supplies them.
        let mut total_amount = Decimal::ZERO;
        let mut priced_items = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            let price: Option<(Decimal,)> =
                sqlx::query_as("SELECT price FROM products WHERE id = $1")
                    .bind(item.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let (price,) = price.ok_or(StoreError::ProductNotFound(item.product_id))?;
            total_amount += price * Decimal::from(item.quantity);
            priced_items.push((item, price));
        }

        let (order_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO orders (user_id, total_amount, shipping_address)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(new_order.user_id)
        .bind(total_amount)
        .bind(&new_order.shipping_address)
        .fetch_one(&mut *tx)
        .await?;

        for (item, price) in priced_items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(price)
            .execute(&mut *tx)
            .await?;

            // No sufficiency check: stock can go negative. Known gap,
            // kept as-is.
            sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $1
                WHERE id = $2
                "#,
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Created order {} for user {}, total {}",
            order_id, new_order.user_id, total_amount
        );
        Ok(OrderReceipt {
            order_id,
            total_amount,
        })
    }

    async fn update_status(&self, id: ModelId, status: OrderStatus) -> Result<bool, StoreError> {
        debug!("Updating order {} status to {}", id, status);
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
