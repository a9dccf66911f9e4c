//! `DieselStore` against a real Postgres: SQL joins, constraints, ordering.
//!
//!   cargo test --test store_test

mod common;

use std::str::FromStr;

use bigdecimal::BigDecimal;
use restaurant_service::domain::errors::DomainError;
use restaurant_service::domain::pipeline::AggregationPipeline;
use restaurant_service::domain::ports::{
    FoodRepository, MenuRepository, OrderItemRepository, OrderRepository, TableRepository,
    UserRepository,
};
use restaurant_service::domain::records::{
    FoodPatch, NewFood, NewMenu, NewTable, NewUser, OrderLineInput, OrderLinePatch, TokenPair,
};
use restaurant_service::DieselStore;
use uuid::Uuid;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

fn seed_table(store: &DieselStore, number: i32) -> Uuid {
    store
        .insert_table(NewTable {
            table_number: number,
            number_of_guests: 2,
        })
        .expect("insert table")
        .id
}

fn seed_food(store: &DieselStore, name: &str, price: &str) -> Uuid {
    let menu = store
        .insert_menu(NewMenu {
            name: "Dinner".to_string(),
            category: "main".to_string(),
            start_date: None,
            end_date: None,
        })
        .expect("insert menu");
    store
        .insert_food(NewFood {
            name: name.to_string(),
            price: dec(price),
            food_image: format!("{name}.png"),
            menu_id: menu.id,
        })
        .expect("insert food")
        .id
}

fn line(food_id: Uuid, quantity: i32) -> OrderLineInput {
    OrderLineInput { food_id, quantity }
}

fn new_user(email: &str, phone: &str) -> NewUser {
    NewUser {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        avatar: None,
        password_hash: "hash".to_string(),
    }
}

#[tokio::test]
async fn aggregate_bills_one_order_through_sql_joins() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let table = seed_table(&store, 4);
    let steak = seed_food(&store, "steak", "12.00");
    let wine = seed_food(&store, "wine", "8.00");
    let placed = store
        .place_order(table, vec![line(steak, 2), line(wine, 1)])
        .expect("place order");

    let bills = store
        .aggregate(&AggregationPipeline::for_order(placed.order_id))
        .expect("aggregate failed");

    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].payment_due, dec("20.00"));
    assert_eq!(bills[0].total_count, 2);
    assert_eq!(bills[0].table_number, Some(4));
    let quantities: Vec<i32> = bills[0].order_items.iter().map(|l| l.quantity).collect();
    assert_eq!(quantities, vec![2, 1]);
}

#[tokio::test]
async fn lines_placed_together_keep_their_request_order() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let table = seed_table(&store, 8);
    let names: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
    let lines: Vec<OrderLineInput> = names
        .iter()
        .map(|name| line(seed_food(&store, name, "1.00"), 1))
        .collect();
    let placed = store.place_order(table, lines).expect("place order");

    let bills = store
        .aggregate(&AggregationPipeline::for_order(placed.order_id))
        .expect("aggregate failed");
    let billed: Vec<String> = bills[0]
        .order_items
        .iter()
        .filter_map(|l| l.food_name.clone())
        .collect();
    assert_eq!(billed, names);

    let listed: Vec<Uuid> = store
        .list_items()
        .expect("list failed")
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(listed, placed.item_ids);
}

#[tokio::test]
async fn aggregate_keeps_items_whose_food_is_missing() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let table = seed_table(&store, 1);
    let soup = seed_food(&store, "soup", "4.50");
    let placed = store
        .place_order(table, vec![line(soup, 1), line(Uuid::new_v4(), 3)])
        .expect("place order");

    let bills = store
        .aggregate(&AggregationPipeline::for_order(placed.order_id))
        .expect("aggregate failed");

    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].total_count, 2);
    assert_eq!(bills[0].payment_due, dec("4.50"));
    assert_eq!(bills[0].order_items[0].food_name.as_deref(), Some("soup"));
    assert!(bills[0].order_items[1].food_name.is_none());
}

#[tokio::test]
async fn aggregate_returns_empty_for_unknown_order() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let bills = store
        .aggregate(&AggregationPipeline::for_order(Uuid::new_v4()))
        .expect("aggregate should not error");

    assert!(bills.is_empty());
}

#[tokio::test]
async fn item_unit_price_follows_the_food() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let table = seed_table(&store, 2);
    let tea = seed_food(&store, "tea", "2.00");
    let placed = store
        .place_order(table, vec![line(tea, 1)])
        .expect("place order");
    let item_id = placed.item_ids[0];

    store
        .update_food(
            tea,
            FoodPatch {
                price: Some(dec("2.40")),
                ..FoodPatch::default()
            },
        )
        .expect("update food")
        .expect("food exists");

    let item = store
        .find_item(item_id)
        .expect("find failed")
        .expect("item exists");
    assert_eq!(item.unit_price, Some(dec("2.40")));

    let updated = store
        .update_item(
            item_id,
            OrderLinePatch {
                quantity: Some(5),
                ..OrderLinePatch::default()
            },
        )
        .expect("update failed")
        .expect("item exists");
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.order_id, placed.order_id);
    assert_eq!(updated.unit_price, Some(dec("2.40")));
}

#[tokio::test]
async fn updates_report_missing_records() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let result = store
        .update_item(Uuid::new_v4(), OrderLinePatch::default())
        .expect("update should not error");
    assert!(result.is_none());

    assert!(store
        .find_table(Uuid::new_v4())
        .expect("find should not error")
        .is_none());
    assert!(store.list_orders().expect("list failed").is_empty());
}

#[tokio::test]
async fn check_violation_is_an_input_error_and_rolls_back() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let table = seed_table(&store, 3);
    let food = seed_food(&store, "bread", "1.00");
    let err = store
        .place_order(table, vec![line(food, 1), line(food, 0)])
        .expect_err("zero quantity must be refused");

    assert!(matches!(err, DomainError::InvalidInput(_)), "got {err:?}");
    assert!(store.list_orders().expect("list failed").is_empty());
    assert!(store.list_items().expect("list failed").is_empty());
}

#[tokio::test]
async fn users_are_found_by_email_and_keep_their_tokens() {
    let (_container, pool) = common::start_postgres().await;
    let store = DieselStore::new(pool);

    let user = store
        .insert_user(new_user("ada@example.com", "555-0100"))
        .expect("insert user");
    assert!(user.token.is_none());

    let found = store
        .find_user_by_email("ada@example.com")
        .expect("find failed")
        .expect("user exists");
    assert_eq!(found.id, user.id);
    assert!(store
        .user_exists("someone@example.com", "555-0100")
        .expect("exists failed"));
    assert!(!store
        .user_exists("someone@example.com", "555-0199")
        .expect("exists failed"));

    let tokens = TokenPair {
        token: "access".to_string(),
        refresh_token: "refresh".to_string(),
    };
    let stored = store
        .store_tokens(user.id, &tokens)
        .expect("store tokens failed")
        .expect("user exists");
    assert_eq!(stored.token.as_deref(), Some("access"));
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
    assert!(store
        .store_tokens(Uuid::new_v4(), &tokens)
        .expect("store tokens failed")
        .is_none());

    let err = store
        .insert_user(new_user("ada@example.com", "555-0101"))
        .expect_err("duplicate email must be refused");
    assert!(matches!(err, DomainError::Conflict(_)), "got {err:?}");
    assert_eq!(store.list_users().expect("list failed").len(), 1);
}
