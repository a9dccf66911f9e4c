use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::records::{Food, Menu, Order, OrderLineItem, Table, User};
use crate::schema::{dining_tables, foods, menus, order_items, orders, users};

// ── dining_tables ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = dining_tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRow {
    pub id: Uuid,
    pub table_number: i32,
    pub number_of_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TableRow> for Table {
    fn from(r: TableRow) -> Self {
        Table {
            id: r.id,
            table_number: r.table_number,
            number_of_guests: r.number_of_guests,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = dining_tables)]
pub struct NewTableRow {
    pub id: Uuid,
    pub table_number: i32,
    pub number_of_guests: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = dining_tables)]
pub struct TableChangeset {
    pub table_number: Option<i32>,
    pub number_of_guests: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ── menus ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = menus)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(r: MenuRow) -> Self {
        Menu {
            id: r.id,
            name: r.name,
            category: r.category,
            start_date: r.start_date,
            end_date: r.end_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = menus)]
pub struct NewMenuRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = menus)]
pub struct MenuChangeset {
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ── foods ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = foods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FoodRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub food_image: String,
    pub menu_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FoodRow> for Food {
    fn from(r: FoodRow) -> Self {
        Food {
            id: r.id,
            name: r.name,
            price: r.price,
            food_image: r.food_image,
            menu_id: r.menu_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = foods)]
pub struct NewFoodRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub food_image: String,
    pub menu_id: Uuid,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = foods)]
pub struct FoodChangeset {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub food_image: Option<String>,
    pub menu_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

// ── orders ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Order {
            id: r.id,
            table_id: r.table_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset {
    pub table_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

// ── order_items ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItemRow {
    /// `unit_price` comes from the food joined at read time.
    pub fn into_domain(self, unit_price: Option<BigDecimal>) -> OrderLineItem {
        OrderLineItem {
            id: self.id,
            order_id: self.order_id,
            food_id: self.food_id,
            quantity: self.quantity,
            unit_price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = order_items)]
pub struct OrderItemChangeset {
    pub food_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ── users ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            avatar: r.avatar,
            password_hash: r.password_hash,
            token: r.token,
            refresh_token: r.refresh_token,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserTokensChangeset<'a> {
    pub token: &'a str,
    pub refresh_token: &'a str,
    pub updated_at: DateTime<Utc>,
}
