use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::pipeline::{AggregationPipeline, BillingSummary};
use crate::domain::ports::RestaurantStore;
use crate::domain::records::{
    Food, FoodPatch, Menu, MenuPatch, NewFood, NewMenu, NewTable, Order, OrderLineInput,
    OrderLineItem, OrderLinePatch, OrderPatch, PlacedOrder, Table, TablePatch,
};

/// Validation and defaulting in front of the record store. Cheap to clone; all
/// clones share the injected store.
#[derive(Clone)]
pub struct RestaurantService {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    // ── Billing ───────────────────────────────────────────────────────────────

    /// One billing summary per (order, table) group of the order's line items.
    /// An order without line items yields an empty list.
    pub fn compute_line_items_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<BillingSummary>, DomainError> {
        self.store
            .aggregate(&AggregationPipeline::for_order(order_id))
    }

    // ── Tables ────────────────────────────────────────────────────────────────

    pub fn create_table(&self, table: NewTable) -> Result<Table, DomainError> {
        non_negative("table_number", table.table_number)?;
        non_negative("number_of_guests", table.number_of_guests)?;
        self.store.insert_table(table)
    }

    pub fn get_table(&self, id: Uuid) -> Result<Table, DomainError> {
        self.store.find_table(id)?.ok_or(DomainError::NotFound("Table"))
    }

    pub fn list_tables(&self) -> Result<Vec<Table>, DomainError> {
        self.store.list_tables()
    }

    pub fn update_table(&self, id: Uuid, patch: TablePatch) -> Result<Table, DomainError> {
        if let Some(n) = patch.table_number {
            non_negative("table_number", n)?;
        }
        if let Some(n) = patch.number_of_guests {
            non_negative("number_of_guests", n)?;
        }
        self.store
            .update_table(id, patch)?
            .ok_or(DomainError::NotFound("Table"))
    }

    // ── Menus ─────────────────────────────────────────────────────────────────

    pub fn create_menu(&self, menu: NewMenu) -> Result<Menu, DomainError> {
        required("name", &menu.name)?;
        required("category", &menu.category)?;
        self.store.insert_menu(menu)
    }

    pub fn get_menu(&self, id: Uuid) -> Result<Menu, DomainError> {
        self.store.find_menu(id)?.ok_or(DomainError::NotFound("Menu"))
    }

    pub fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        self.store.list_menus()
    }

    pub fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<Menu, DomainError> {
        if let (Some(start), Some(end)) = (patch.start_date, patch.end_date) {
            if !in_time_span(start, end, Utc::now()) {
                return Err(DomainError::InvalidInput("Kindly retype the time".to_string()));
            }
        }
        self.store
            .update_menu(id, patch)?
            .ok_or(DomainError::NotFound("Menu"))
    }

    // ── Foods ─────────────────────────────────────────────────────────────────

    pub fn create_food(&self, mut food: NewFood) -> Result<Food, DomainError> {
        required("name", &food.name)?;
        self.require_menu(food.menu_id)?;
        food.price = round_price(&food.price)?;
        self.store.insert_food(food)
    }

    pub fn get_food(&self, id: Uuid) -> Result<Food, DomainError> {
        self.store.find_food(id)?.ok_or(DomainError::NotFound("Food"))
    }

    pub fn list_foods(&self) -> Result<Vec<Food>, DomainError> {
        self.store.list_foods()
    }

    pub fn update_food(&self, id: Uuid, mut patch: FoodPatch) -> Result<Food, DomainError> {
        if let Some(menu_id) = patch.menu_id {
            self.require_menu(menu_id)?;
        }
        if let Some(price) = &patch.price {
            patch.price = Some(round_price(price)?);
        }
        self.store
            .update_food(id, patch)?
            .ok_or(DomainError::NotFound("Food"))
    }

    fn require_menu(&self, menu_id: Uuid) -> Result<(), DomainError> {
        match self.store.find_menu(menu_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::InvalidInput("Menu was not found".to_string())),
        }
    }

    // ── Orders ────────────────────────────────────────────────────────────────

    pub fn create_order(&self, table_id: Option<Uuid>) -> Result<Order, DomainError> {
        if let Some(table_id) = table_id {
            self.require_table(table_id)?;
        }
        self.store.insert_order(table_id)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.store.find_order(id)?.ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.store.list_orders()
    }

    pub fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Order, DomainError> {
        if let Some(table_id) = patch.table_id {
            self.require_table(table_id)?;
        }
        self.store
            .update_order(id, patch)?
            .ok_or(DomainError::NotFound("Order"))
    }

    fn require_table(&self, table_id: Uuid) -> Result<(), DomainError> {
        match self.store.find_table(table_id)? {
            Some(_) => Ok(()),
            None => Err(DomainError::InvalidInput("Table was not found".to_string())),
        }
    }

    // ── Order items ───────────────────────────────────────────────────────────

    /// Open a new order on `table_id` holding `lines`. Nothing is written when
    /// any line has a non-positive quantity.
    pub fn place_order(
        &self,
        table_id: Uuid,
        lines: Vec<OrderLineInput>,
    ) -> Result<PlacedOrder, DomainError> {
        let rejected: Vec<OrderLineInput> =
            lines.iter().filter(|l| l.quantity < 1).cloned().collect();
        if !rejected.is_empty() {
            return Err(DomainError::RejectedLineItems(rejected));
        }
        self.store.place_order(table_id, lines)
    }

    pub fn get_item(&self, id: Uuid) -> Result<OrderLineItem, DomainError> {
        self.store
            .find_item(id)?
            .ok_or(DomainError::NotFound("Order item"))
    }

    pub fn list_items(&self) -> Result<Vec<OrderLineItem>, DomainError> {
        self.store.list_items()
    }

    pub fn update_item(
        &self,
        id: Uuid,
        patch: OrderLinePatch,
    ) -> Result<OrderLineItem, DomainError> {
        if matches!(patch.quantity, Some(q) if q < 1) {
            return Err(DomainError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }
        self.store
            .update_item(id, patch)?
            .ok_or(DomainError::NotFound("Order item"))
    }
}

fn required(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn non_negative(field: &str, value: i32) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::InvalidInput(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// Exclusive upper bound of the price column, `NUMERIC(10, 2)`.
const PRICE_LIMIT: u64 = 100_000_000;

/// Prices are stored with exactly two fractional digits, rounded half-up.
fn round_price(price: &BigDecimal) -> Result<BigDecimal, DomainError> {
    if price < &BigDecimal::from(0) {
        return Err(DomainError::InvalidInput(
            "price must not be negative".to_string(),
        ));
    }
    let rounded = price.with_scale_round(2, RoundingMode::HalfUp);
    if rounded >= BigDecimal::from(PRICE_LIMIT) {
        return Err(DomainError::InvalidInput(format!(
            "price must be below {}",
            PRICE_LIMIT
        )));
    }
    Ok(rounded)
}

/// A menu window is valid when it starts in the future and ends after it starts.
fn in_time_span(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start > now && end > start
}
