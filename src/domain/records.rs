use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// ── Stored records ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: Uuid,
    pub table_number: i32,
    pub number_of_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub food_image: String,
    pub menu_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One food-quantity entry within an order.
///
/// `unit_price` is not stored with the item; it is copied from the referenced
/// food whenever the item is read and is `None` when the food no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    pub unit_price: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Inputs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewTable {
    pub table_number: i32,
    pub number_of_guests: i32,
}

#[derive(Debug, Clone, Default)]
pub struct TablePatch {
    pub table_number: Option<i32>,
    pub number_of_guests: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct MenuPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub price: BigDecimal,
    pub food_image: String,
    pub menu_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct FoodPatch {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub food_image: Option<String>,
    pub menu_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub table_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineInput {
    pub food_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct OrderLinePatch {
    pub food_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

/// Result of placing a batch of line items on a table: the order created for
/// them and the ids of the inserted items, in request order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub item_ids: Vec<Uuid>,
}

// ── Users ─────────────────────────────────────────────────────────────────────

/// A staff account. `password_hash` never leaves the service layer.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
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

/// Sign-up form as received; the password is still plain text.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub password: String,
}

/// What the store persists for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthClaims {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
