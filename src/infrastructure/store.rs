use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::pipeline::{
    AggregationPipeline, BillingSummary, FoodRef, JoinedLineRow, LineItemFilter, OrderRef,
    TableRef,
};
use crate::domain::ports::{
    FoodRepository, MenuRepository, OrderItemRepository, OrderRepository, TableRepository,
    UserRepository,
};
use crate::domain::records::{
    Food, FoodPatch, Menu, MenuPatch, NewFood, NewMenu, NewTable, NewUser, Order,
    OrderLineInput, OrderLineItem, OrderLinePatch, OrderPatch, PlacedOrder, Table, TablePatch,
    TokenPair, User,
};
use crate::schema::{dining_tables, foods, menus, order_items, orders, users};

use super::models::{
    FoodChangeset, FoodRow, MenuChangeset, MenuRow, NewFoodRow, NewMenuRow, NewOrderItemRow,
    NewOrderRow, NewTableRow, NewUserRow, OrderChangeset, OrderItemChangeset, OrderItemRow,
    OrderRow, TableChangeset, TableRow, UserRow, UserTokensChangeset,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

/// Constraint violations are the caller's fault; everything else means the
/// store could not do its job.
impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::Error::DatabaseError;

        match e {
            DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            DatabaseError(
                DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation,
                info,
            ) => DomainError::InvalidInput(info.message().to_string()),
            other => DomainError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::StoreUnavailable(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Postgres-backed record store.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TableRepository for DieselStore {
    fn insert_table(&self, table: NewTable) -> Result<Table, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(dining_tables::table)
            .values(&NewTableRow {
                id: Uuid::new_v4(),
                table_number: table.table_number,
                number_of_guests: table.number_of_guests,
            })
            .returning(TableRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_table(&self, id: Uuid) -> Result<Option<Table>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = dining_tables::table
            .find(id)
            .select(TableRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list_tables(&self) -> Result<Vec<Table>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = dining_tables::table
            .select(TableRow::as_select())
            .order(dining_tables::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn update_table(&self, id: Uuid, patch: TablePatch) -> Result<Option<Table>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(dining_tables::table.find(id))
            .set(&TableChangeset {
                table_number: patch.table_number,
                number_of_guests: patch.number_of_guests,
                updated_at: Utc::now(),
            })
            .returning(TableRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}

impl MenuRepository for DieselStore {
    fn insert_menu(&self, menu: NewMenu) -> Result<Menu, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(menus::table)
            .values(&NewMenuRow {
                id: Uuid::new_v4(),
                name: menu.name,
                category: menu.category,
                start_date: menu.start_date,
                end_date: menu.end_date,
            })
            .returning(MenuRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_menu(&self, id: Uuid) -> Result<Option<Menu>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = menus::table
            .find(id)
            .select(MenuRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list_menus(&self) -> Result<Vec<Menu>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = menus::table
            .select(MenuRow::as_select())
            .order(menus::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn update_menu(&self, id: Uuid, patch: MenuPatch) -> Result<Option<Menu>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(menus::table.find(id))
            .set(&MenuChangeset {
                name: patch.name,
                category: patch.category,
                start_date: patch.start_date,
                end_date: patch.end_date,
                updated_at: Utc::now(),
            })
            .returning(MenuRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}

impl FoodRepository for DieselStore {
    fn insert_food(&self, food: NewFood) -> Result<Food, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(foods::table)
            .values(&NewFoodRow {
                id: Uuid::new_v4(),
                name: food.name,
                price: food.price,
                food_image: food.food_image,
                menu_id: food.menu_id,
            })
            .returning(FoodRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_food(&self, id: Uuid) -> Result<Option<Food>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = foods::table
            .find(id)
            .select(FoodRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list_foods(&self) -> Result<Vec<Food>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = foods::table
            .select(FoodRow::as_select())
            .order(foods::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn update_food(&self, id: Uuid, patch: FoodPatch) -> Result<Option<Food>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(foods::table.find(id))
            .set(&FoodChangeset {
                name: patch.name,
                price: patch.price,
                food_image: patch.food_image,
                menu_id: patch.menu_id,
                updated_at: Utc::now(),
            })
            .returning(FoodRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}

impl OrderRepository for DieselStore {
    fn insert_order(&self, table_id: Option<Uuid>) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                table_id,
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(orders::table.find(id))
            .set(&OrderChangeset {
                table_id: patch.table_id,
                updated_at: Utc::now(),
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}

/// Row shape of the billing join: the line item, then food name/price/image,
/// order id/table id, table id/number. Every joined column is nullable.
type JoinedTuple = (
    OrderItemRow,
    Option<String>,
    Option<BigDecimal>,
    Option<String>,
    Option<Uuid>,
    Option<Uuid>,
    Option<Uuid>,
    Option<i32>,
);

fn load_item(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<OrderLineItem>> {
    let row = order_items::table
        .left_join(foods::table.on(foods::id.eq(order_items::food_id)))
        .filter(order_items::id.eq(id))
        .select((OrderItemRow::as_select(), foods::price.nullable()))
        .first::<(OrderItemRow, Option<BigDecimal>)>(conn)
        .optional()?;
    Ok(row.map(|(item, price)| item.into_domain(price)))
}

impl OrderItemRepository for DieselStore {
    fn place_order(
        &self,
        table_id: Uuid,
        lines: Vec<OrderLineInput>,
    ) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    table_id: Some(table_id),
                })
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = lines
                .iter()
                .map(|l| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    food_id: l.food_id,
                    quantity: l.quantity,
                })
                .collect();
            if !new_items.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .execute(conn)?;
            }

            Ok(PlacedOrder {
                order_id,
                item_ids: new_items.iter().map(|i| i.id).collect(),
            })
        })
    }

    fn find_item(&self, id: Uuid) -> Result<Option<OrderLineItem>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(load_item(&mut conn, id)?)
    }

    fn list_items(&self) -> Result<Vec<OrderLineItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = order_items::table
            .left_join(foods::table.on(foods::id.eq(order_items::food_id)))
            .select((OrderItemRow::as_select(), foods::price.nullable()))
            .order(order_items::seq.asc())
            .load::<(OrderItemRow, Option<BigDecimal>)>(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(item, price)| item.into_domain(price))
            .collect())
    }

    fn update_item(
        &self,
        id: Uuid,
        patch: OrderLinePatch,
    ) -> Result<Option<OrderLineItem>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(order_items::table.find(id))
                .set(&OrderItemChangeset {
                    food_id: patch.food_id,
                    quantity: patch.quantity,
                    updated_at: Utc::now(),
                })
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }
            Ok(load_item(conn, id)?)
        })
    }

    /// Match and the three lookups run as one SQL statement with LEFT JOINs;
    /// projection and grouping run over the returned rows.
    fn aggregate(&self, pipeline: &AggregationPipeline) -> Result<Vec<BillingSummary>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = order_items::table
            .left_join(foods::table.on(foods::id.eq(order_items::food_id)))
            .left_join(orders::table.on(orders::id.eq(order_items::order_id)))
            .left_join(
                dining_tables::table.on(orders::table_id.eq(dining_tables::id.nullable())),
            )
            .select((
                OrderItemRow::as_select(),
                foods::name.nullable(),
                foods::price.nullable(),
                foods::food_image.nullable(),
                orders::id.nullable(),
                orders::table_id.nullable(),
                dining_tables::id.nullable(),
                dining_tables::table_number.nullable(),
            ))
            .order(order_items::seq.asc())
            .into_boxed();

        if let LineItemFilter::Order(order_id) = pipeline.filter() {
            query = query.filter(order_items::order_id.eq(order_id));
        }

        let rows: Vec<JoinedTuple> = query.load(&mut conn)?;
        log::debug!(
            "billing aggregation ({:?}) joined {} line item(s)",
            pipeline.filter(),
            rows.len()
        );

        let joined = rows
            .into_iter()
            .map(
                |(item, food_name, price, food_image, order_id, order_table_id, table_id, table_number)| {
                    let food = match (food_name, price.clone(), food_image) {
                        (Some(name), Some(price), Some(food_image)) => Some(FoodRef {
                            name,
                            price,
                            food_image,
                        }),
                        _ => None,
                    };
                    JoinedLineRow {
                        item: item.into_domain(price),
                        food,
                        order: order_id.map(|id| OrderRef {
                            id,
                            table_id: order_table_id,
                        }),
                        table: table_id
                            .zip(table_number)
                            .map(|(id, table_number)| TableRef { id, table_number }),
                    }
                },
            )
            .collect();

        pipeline.finish(joined)
    }
}

impl UserRepository for DieselStore {
    fn insert_user(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone: user.phone,
                avatar: user.avatar,
                password_hash: user.password_hash,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = users::table
            .select(UserRow::as_select())
            .order(users::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn user_exists(&self, email: &str, phone: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let taken = diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email).or(users::phone.eq(phone))),
        ))
        .get_result(&mut conn)?;
        Ok(taken)
    }

    fn store_tokens(&self, id: Uuid, tokens: &TokenPair) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(users::table.find(id))
            .set(&UserTokensChangeset {
                token: &tokens.token,
                refresh_token: &tokens.refresh_token,
                updated_at: Utc::now(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}
