//! In-process record store used as a test double for the service and handlers.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::pipeline::{AggregationPipeline, BillingSummary, Collections};
use crate::domain::ports::{
    Credentials, FoodRepository, MenuRepository, OrderItemRepository, OrderRepository,
    TableRepository, UserRepository,
};
use crate::domain::records::{
    AuthClaims, Food, FoodPatch, Menu, MenuPatch, NewFood, NewMenu, NewTable, NewUser, Order,
    OrderLineInput, OrderLineItem, OrderLinePatch, OrderPatch, PlacedOrder, Table, TablePatch,
    TokenPair, User,
};

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Collections>,
    menus: Mutex<Vec<Menu>>,
    users: Mutex<Vec<User>>,
    /// When set, every call fails as if the store were unreachable.
    offline: bool,
}

impl MemoryStore {
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn data(&self) -> Result<MutexGuard<'_, Collections>, DomainError> {
        if self.offline {
            return Err(DomainError::StoreUnavailable("connection refused".to_string()));
        }
        self.data
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn menus(&self) -> Result<MutexGuard<'_, Vec<Menu>>, DomainError> {
        if self.offline {
            return Err(DomainError::StoreUnavailable("connection refused".to_string()));
        }
        self.menus
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<User>>, DomainError> {
        if self.offline {
            return Err(DomainError::StoreUnavailable("connection refused".to_string()));
        }
        self.users
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Insert a line item directly, bypassing order creation.
    pub fn push_item(&self, order_id: Uuid, food_id: Uuid, quantity: i32) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        if let Ok(mut data) = self.data() {
            data.line_items.push(OrderLineItem {
                id,
                order_id,
                food_id,
                quantity,
                unit_price: None,
                created_at: now,
                updated_at: now,
            });
        }
        id
    }
}

fn with_unit_price(item: &OrderLineItem, foods: &[Food]) -> OrderLineItem {
    let mut item = item.clone();
    item.unit_price = foods
        .iter()
        .find(|f| f.id == item.food_id)
        .map(|f| f.price.clone());
    item
}

impl TableRepository for MemoryStore {
    fn insert_table(&self, table: NewTable) -> Result<Table, DomainError> {
        let now = Utc::now();
        let table = Table {
            id: Uuid::new_v4(),
            table_number: table.table_number,
            number_of_guests: table.number_of_guests,
            created_at: now,
            updated_at: now,
        };
        self.data()?.tables.push(table.clone());
        Ok(table)
    }

    fn find_table(&self, id: Uuid) -> Result<Option<Table>, DomainError> {
        Ok(self.data()?.tables.iter().find(|t| t.id == id).cloned())
    }

    fn list_tables(&self) -> Result<Vec<Table>, DomainError> {
        Ok(self.data()?.tables.clone())
    }

    fn update_table(&self, id: Uuid, patch: TablePatch) -> Result<Option<Table>, DomainError> {
        let mut data = self.data()?;
        Ok(data.tables.iter_mut().find(|t| t.id == id).map(|t| {
            if let Some(n) = patch.table_number {
                t.table_number = n;
            }
            if let Some(n) = patch.number_of_guests {
                t.number_of_guests = n;
            }
            t.updated_at = Utc::now();
            t.clone()
        }))
    }
}

impl MenuRepository for MemoryStore {
    fn insert_menu(&self, menu: NewMenu) -> Result<Menu, DomainError> {
        let now = Utc::now();
        let menu = Menu {
            id: Uuid::new_v4(),
            name: menu.name,
            category: menu.category,
            start_date: menu.start_date,
            end_date: menu.end_date,
            created_at: now,
            updated_at: now,
        };
        self.menus()?.push(menu.clone());
        Ok(menu)
    }

    fn find_menu(&self, id: Uuid) -> Result<Option<Menu>, DomainError> {
        Ok(self.menus()?.iter().find(|m| m.id == id).cloned())
    }

    fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        Ok(self.menus()?.clone())
    }

    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<Option<Menu>, DomainError> {
        let mut menus = self.menus()?;
        Ok(menus.iter_mut().find(|m| m.id == id).map(|m| {
            if let Some(name) = patch.name {
                m.name = name;
            }
            if let Some(category) = patch.category {
                m.category = category;
            }
            if patch.start_date.is_some() {
                m.start_date = patch.start_date;
            }
            if patch.end_date.is_some() {
                m.end_date = patch.end_date;
            }
            m.updated_at = Utc::now();
            m.clone()
        }))
    }
}

impl FoodRepository for MemoryStore {
    fn insert_food(&self, food: NewFood) -> Result<Food, DomainError> {
        let now = Utc::now();
        let food = Food {
            id: Uuid::new_v4(),
            name: food.name,
            price: food.price,
            food_image: food.food_image,
            menu_id: food.menu_id,
            created_at: now,
            updated_at: now,
        };
        self.data()?.foods.push(food.clone());
        Ok(food)
    }

    fn find_food(&self, id: Uuid) -> Result<Option<Food>, DomainError> {
        Ok(self.data()?.foods.iter().find(|f| f.id == id).cloned())
    }

    fn list_foods(&self) -> Result<Vec<Food>, DomainError> {
        Ok(self.data()?.foods.clone())
    }

    fn update_food(&self, id: Uuid, patch: FoodPatch) -> Result<Option<Food>, DomainError> {
        let mut data = self.data()?;
        Ok(data.foods.iter_mut().find(|f| f.id == id).map(|f| {
            if let Some(name) = patch.name {
                f.name = name;
            }
            if let Some(price) = patch.price {
                f.price = price;
            }
            if let Some(image) = patch.food_image {
                f.food_image = image;
            }
            if let Some(menu_id) = patch.menu_id {
                f.menu_id = menu_id;
            }
            f.updated_at = Utc::now();
            f.clone()
        }))
    }
}

impl OrderRepository for MemoryStore {
    fn insert_order(&self, table_id: Option<Uuid>) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            table_id,
            created_at: now,
            updated_at: now,
        };
        self.data()?.orders.push(order.clone());
        Ok(order)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.data()?.orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.data()?.orders.clone())
    }

    fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Option<Order>, DomainError> {
        let mut data = self.data()?;
        Ok(data.orders.iter_mut().find(|o| o.id == id).map(|o| {
            if patch.table_id.is_some() {
                o.table_id = patch.table_id;
            }
            o.updated_at = Utc::now();
            o.clone()
        }))
    }
}

impl OrderItemRepository for MemoryStore {
    fn place_order(
        &self,
        table_id: Uuid,
        lines: Vec<OrderLineInput>,
    ) -> Result<PlacedOrder, DomainError> {
        let order = self.insert_order(Some(table_id))?;
        let item_ids = lines
            .into_iter()
            .map(|l| self.push_item(order.id, l.food_id, l.quantity))
            .collect();
        Ok(PlacedOrder {
            order_id: order.id,
            item_ids,
        })
    }

    fn find_item(&self, id: Uuid) -> Result<Option<OrderLineItem>, DomainError> {
        let data = self.data()?;
        Ok(data
            .line_items
            .iter()
            .find(|i| i.id == id)
            .map(|i| with_unit_price(i, &data.foods)))
    }

    fn list_items(&self) -> Result<Vec<OrderLineItem>, DomainError> {
        let data = self.data()?;
        Ok(data
            .line_items
            .iter()
            .map(|i| with_unit_price(i, &data.foods))
            .collect())
    }

    fn update_item(
        &self,
        id: Uuid,
        patch: OrderLinePatch,
    ) -> Result<Option<OrderLineItem>, DomainError> {
        let mut data = self.data()?;
        let Some(item) = data.line_items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(food_id) = patch.food_id {
            item.food_id = food_id;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        item.updated_at = Utc::now();
        let item = item.clone();
        Ok(Some(with_unit_price(&item, &data.foods)))
    }

    fn aggregate(&self, pipeline: &AggregationPipeline) -> Result<Vec<BillingSummary>, DomainError> {
        let data = self.data()?;
        pipeline.execute(&data)
    }
}

impl UserRepository for MemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            avatar: user.avatar,
            password_hash: user.password_hash,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        self.users()?.push(user.clone());
        Ok(user)
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users()?.iter().find(|u| u.id == id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users()?.iter().find(|u| u.email == email).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users()?.clone())
    }

    fn user_exists(&self, email: &str, phone: &str) -> Result<bool, DomainError> {
        Ok(self
            .users()?
            .iter()
            .any(|u| u.email == email || u.phone == phone))
    }

    fn store_tokens(&self, id: Uuid, tokens: &TokenPair) -> Result<Option<User>, DomainError> {
        let mut users = self.users()?;
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.token = Some(tokens.token.clone());
            u.refresh_token = Some(tokens.refresh_token.clone());
            u.updated_at = Utc::now();
            u.clone()
        }))
    }
}

/// Reversible stand-in for password hashing and token signing. An access token
/// is `token:<user id>`.
pub struct PlainCredentials;

impl PlainCredentials {
    pub fn token_for(user_id: Uuid) -> String {
        format!("token:{}", user_id)
    }
}

impl Credentials for PlainCredentials {
    fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        Ok(format!("plain${}", password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        Ok(TokenPair {
            token: Self::token_for(user.id),
            refresh_token: format!("refresh:{}", user.id),
        })
    }

    fn verify_token(&self, token: &str) -> Result<AuthClaims, DomainError> {
        token
            .strip_prefix("token:")
            .and_then(|id| Uuid::parse_str(id).ok())
            .map(|user_id| AuthClaims {
                user_id,
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .ok_or_else(|| DomainError::Unauthorized("Invalid token".to_string()))
    }
}
