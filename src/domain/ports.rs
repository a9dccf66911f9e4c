use uuid::Uuid;

use super::errors::DomainError;
use super::pipeline::{AggregationPipeline, BillingSummary};
use super::records::{
    AuthClaims, Food, FoodPatch, Menu, MenuPatch, NewFood, NewMenu, NewTable, NewUser, Order,
    OrderLineInput, OrderLineItem, OrderLinePatch, OrderPatch, PlacedOrder, Table, TablePatch,
    TokenPair, User,
};

// Update methods return `Ok(None)` when no record carries the id.

pub trait TableRepository: Send + Sync + 'static {
    fn insert_table(&self, table: NewTable) -> Result<Table, DomainError>;
    fn find_table(&self, id: Uuid) -> Result<Option<Table>, DomainError>;
    fn list_tables(&self) -> Result<Vec<Table>, DomainError>;
    fn update_table(&self, id: Uuid, patch: TablePatch) -> Result<Option<Table>, DomainError>;
}

pub trait MenuRepository: Send + Sync + 'static {
    fn insert_menu(&self, menu: NewMenu) -> Result<Menu, DomainError>;
    fn find_menu(&self, id: Uuid) -> Result<Option<Menu>, DomainError>;
    fn list_menus(&self) -> Result<Vec<Menu>, DomainError>;
    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<Option<Menu>, DomainError>;
}

pub trait FoodRepository: Send + Sync + 'static {
    fn insert_food(&self, food: NewFood) -> Result<Food, DomainError>;
    fn find_food(&self, id: Uuid) -> Result<Option<Food>, DomainError>;
    fn list_foods(&self) -> Result<Vec<Food>, DomainError>;
    fn update_food(&self, id: Uuid, patch: FoodPatch) -> Result<Option<Food>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn insert_order(&self, table_id: Option<Uuid>) -> Result<Order, DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_orders(&self) -> Result<Vec<Order>, DomainError>;
    fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Option<Order>, DomainError>;
}

pub trait OrderItemRepository: Send + Sync + 'static {
    /// Create an order on `table_id` and insert every line into it, atomically.
    fn place_order(
        &self,
        table_id: Uuid,
        lines: Vec<OrderLineInput>,
    ) -> Result<PlacedOrder, DomainError>;
    fn find_item(&self, id: Uuid) -> Result<Option<OrderLineItem>, DomainError>;
    fn list_items(&self) -> Result<Vec<OrderLineItem>, DomainError>;
    fn update_item(
        &self,
        id: Uuid,
        patch: OrderLinePatch,
    ) -> Result<Option<OrderLineItem>, DomainError>;
    /// Run `pipeline` in a single round trip to the store.
    fn aggregate(&self, pipeline: &AggregationPipeline) -> Result<Vec<BillingSummary>, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    fn list_users(&self) -> Result<Vec<User>, DomainError>;
    /// True when any account already uses `email` or `phone`.
    fn user_exists(&self, email: &str, phone: &str) -> Result<bool, DomainError>;
    fn store_tokens(&self, id: Uuid, tokens: &TokenPair) -> Result<Option<User>, DomainError>;
}

/// Password hashing and token issuance, kept out of the service so tests can
/// swap in a cheap implementation.
pub trait Credentials: Send + Sync + 'static {
    fn hash_password(&self, password: &str) -> Result<String, DomainError>;
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError>;
    /// Fails with `Unauthorized` for anything but a valid, unexpired access token.
    fn verify_token(&self, token: &str) -> Result<AuthClaims, DomainError>;
}

/// Everything the service needs from persistence.
pub trait RestaurantStore:
    TableRepository + MenuRepository + FoodRepository + OrderRepository + OrderItemRepository
{
}

impl<T> RestaurantStore for T where
    T: TableRepository + MenuRepository + FoodRepository + OrderRepository + OrderItemRepository
{
}
