use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{run, AppState};
use crate::domain::pipeline::{BillingSummary, ProjectedLine};
use crate::domain::records::{OrderLineInput, OrderLineItem, OrderLinePatch};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemLineRequest {
    pub food_id: Uuid,
    pub quantity: i32,
}

/// A batch of line items to place on a table as a new order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemsRequest {
    pub table_id: Uuid,
    #[serde(default)]
    pub order_items: Vec<OrderItemLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderItemsResponse {
    pub order_id: Uuid,
    pub inserted_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
    pub food_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    /// Current price of the referenced food; null when the food is gone.
    pub unit_price: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderLineItem> for OrderItemResponse {
    fn from(i: OrderLineItem) -> Self {
        Self {
            id: i.id,
            order_id: i.order_id,
            food_id: i.food_id,
            quantity: i.quantity,
            unit_price: i.unit_price.map(|p| p.to_string()),
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.to_rfc3339(),
        }
    }
}

// ── Invoice view ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceLineView {
    pub amount: Option<String>,
    pub total_count: i64,
    pub food_name: Option<String>,
    pub food_image: Option<String>,
    pub table_number: Option<i32>,
    pub table_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub price: Option<String>,
    pub quantity: i32,
}

impl From<ProjectedLine> for InvoiceLineView {
    fn from(l: ProjectedLine) -> Self {
        Self {
            amount: l.amount.map(|a| a.to_string()),
            total_count: l.total_count,
            food_name: l.food_name,
            food_image: l.food_image,
            table_number: l.table_number,
            table_id: l.table_id,
            order_id: l.order_id,
            price: l.price.map(|p| p.to_string()),
            quantity: l.quantity,
        }
    }
}

/// Wire shape of one billing summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceView {
    pub payment_due: String,
    pub total_count: i64,
    pub table_number: Option<i32>,
    pub order_items: Vec<InvoiceLineView>,
}

impl From<BillingSummary> for InvoiceView {
    fn from(s: BillingSummary) -> Self {
        Self {
            payment_due: s.payment_due.to_string(),
            total_count: s.total_count,
            table_number: s.table_number,
            order_items: s.order_items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orderItems
#[utoipa::path(
    get,
    path = "/orderItems",
    responses(
        (status = 200, description = "All order items", body = [OrderItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn list_order_items(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let items = run(&state, |svc| svc.list_items()).await?;
    let body: Vec<OrderItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orderItems/{id}
#[utoipa::path(
    get,
    path = "/orderItems/{id}",
    params(("id" = Uuid, Path, description = "Order item UUID")),
    responses(
        (status = 200, description = "Order item found", body = OrderItemResponse),
        (status = 404, description = "Order item not found"),
    ),
    tag = "order-items"
)]
pub async fn get_order_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = run(&state, move |svc| svc.get_item(id)).await?;
    Ok(HttpResponse::Ok().json(OrderItemResponse::from(item)))
}

/// GET /orderItems-order/{id}
///
/// Billing summaries for the order's line items. An order with no items gives
/// an empty array.
#[utoipa::path(
    get,
    path = "/orderItems-order/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Billing summaries", body = [InvoiceView]),
        (status = 500, description = "Record store failure"),
    ),
    tag = "order-items"
)]
pub async fn get_order_items_by_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let summaries = run(&state, move |svc| svc.compute_line_items_for_order(order_id)).await?;
    let body: Vec<InvoiceView> = summaries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /orderItems
///
/// Opens a new order on `table_id` and inserts every line into it. Any line
/// with a non-positive quantity rejects the whole batch.
#[utoipa::path(
    post,
    path = "/orderItems",
    request_body = CreateOrderItemsRequest,
    responses(
        (status = 201, description = "Order and items created", body = CreateOrderItemsResponse),
        (status = 400, description = "Invalid line items"),
    ),
    tag = "order-items"
)]
pub async fn create_order_items(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderItemsRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let lines: Vec<OrderLineInput> = body
        .order_items
        .into_iter()
        .map(|l| OrderLineInput {
            food_id: l.food_id,
            quantity: l.quantity,
        })
        .collect();
    let table_id = body.table_id;

    let placed = run(&state, move |svc| svc.place_order(table_id, lines)).await?;
    Ok(HttpResponse::Created().json(CreateOrderItemsResponse {
        order_id: placed.order_id,
        inserted_ids: placed.item_ids,
    }))
}

/// PATCH /orderItems/{id}
#[utoipa::path(
    patch,
    path = "/orderItems/{id}",
    params(("id" = Uuid, Path, description = "Order item UUID")),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Order item updated", body = OrderItemResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Order item not found"),
    ),
    tag = "order-items"
)]
pub async fn update_order_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let item = run(&state, move |svc| {
        svc.update_item(
            id,
            OrderLinePatch {
                food_id: body.food_id,
                quantity: body.quantity,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(OrderItemResponse::from(item)))
}
