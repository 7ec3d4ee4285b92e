//! Order placement, lookup and status endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use checkout::{
    InMemoryPaymentGateway, LogNotifier, OrderPlacement, OrderQueries, PlaceOrder,
    StatusTransitions,
};
use common::{Money, OrderId, ProductId, UserId};
use ledger::LedgerStore;
use order_store::{NewOrder, Order, OrderFilter, OrderStore};
use serde::Deserialize;

use crate::error::ApiError;

/// Header carrying the authenticated user id, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the address order confirmations are sent to.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, L: LedgerStore> {
    pub placement: OrderPlacement<S, L, InMemoryPaymentGateway, LogNotifier>,
    pub queries: OrderQueries<S>,
    pub statuses: StatusTransitions<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -- Handlers --

/// POST /orders: place an order for the calling user.
///
/// The total is computed from the submitted items. New orders always start
/// in the default status.
#[tracing::instrument(skip(state, headers, req))]
pub async fn place<S, L>(
    State(state): State<Arc<AppState<S, L>>>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let user_id = caller(&headers)?;

    let mut order = NewOrder::new(user_id, Money::zero());
    for item in &req.items {
        let product_id = parse_id::<ProductId>("product_id", &item.product_id)?;
        order = order.with_line(product_id, item.quantity, Money::from_cents(item.price_cents));
    }
    order.total = order
        .line_total()
        .ok_or_else(|| ApiError::BadRequest("Order total overflows".to_string()))?;

    let mut request = PlaceOrder::new(order);
    if let Some(address) = header(&headers, USER_EMAIL_HEADER) {
        request = request.notify(address);
    }

    let placed = state.placement.place(request).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /orders/{id}: load an order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S, L>(
    State(state): State<Arc<AppState<S, L>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError>
where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let order_id = parse_id::<OrderId>("order id", &id)?;
    let order = state.queries.get_by_id(order_id).await?;
    Ok(Json(order))
}

/// GET /users/{id}/orders: list a user's orders, oldest first.
#[tracing::instrument(skip(state, query))]
pub async fn list_by_user<S, L>(
    State(state): State<Arc<AppState<S, L>>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let user_id = parse_id::<UserId>("user id", &id)?;
    let filter = OrderFilter {
        limit: query.limit,
        offset: query.offset,
    };
    let orders = state.queries.list_by_user(user_id, filter).await?;
    Ok(Json(orders))
}

/// PUT /orders/{id}/status: replace an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S, L>(
    State(state): State<Arc<AppState<S, L>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError>
where
    S: OrderStore + 'static,
    L: LedgerStore + 'static,
{
    let order_id = parse_id::<OrderId>("order id", &id)?;
    let order = state.statuses.update_status(order_id, &req.status).await?;
    Ok(Json(order))
}

// -- Helpers --

fn parse_id<T: FromStr>(what: &str, value: &str) -> Result<T, ApiError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {what}: {e}")))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn caller(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = header(headers, USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?;
    parse_id("user id", value)
}
