use crate::error::ServiceError;
use crate::model::{CreateOrderRequest, ModelId};
use crate::service::OrderService;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub const SERVICE_NAME: &str = "order-service";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(message) => error_response(StatusCode::BAD_REQUEST, message),
            ServiceError::NotFound => error_response(StatusCode::NOT_FOUND, "Order not found"),
            ServiceError::Store(cause) => {
                // The raw cause goes to the log only, never to the
                // client.
                tracing::error!(error = %cause, "Store operation failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let fetched = state.service.list_orders().await?;
    Ok(Json(fetched).into_response())
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
) -> Result<Response, ServiceError> {
    let fetched = state.service.get_order(id).await?;
    Ok(Json(fetched).into_response())
}

#[derive(Serialize)]
struct CreatedBody {
    message: &'static str,
    order_id: ModelId,
    total_amount: rust_decimal::Decimal,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    let receipt = state.service.create_order(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBody {
            message: "Order created successfully",
            order_id: receipt.order_id,
            total_amount: receipt.total_amount,
        }),
    )
        .into_response())
}

#[derive(serde::Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<ModelId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Response, ServiceError> {
    state
        .service
        .update_order_status(id, &request.status)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Order status updated" })).into_response())
}
