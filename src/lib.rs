pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::restaurant_service::RestaurantService;
pub use application::user_service::UserService;
pub use config::Settings;
pub use db::{create_pool, DbPool};
pub use handlers::AppState;
pub use infrastructure::auth::JwtCredentials;
pub use infrastructure::store::DieselStore;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::sign_up,
        handlers::users::login,
        handlers::tables::list_tables,
        handlers::tables::get_table,
        handlers::tables::create_table,
        handlers::tables::update_table,
        handlers::menus::list_menus,
        handlers::menus::get_menu,
        handlers::menus::create_menu,
        handlers::menus::update_menu,
        handlers::foods::list_foods,
        handlers::foods::get_food,
        handlers::foods::create_food,
        handlers::foods::update_food,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::create_order,
        handlers::orders::update_order,
        handlers::order_items::list_order_items,
        handlers::order_items::get_order_item,
        handlers::order_items::get_order_items_by_order,
        handlers::order_items::create_order_items,
        handlers::order_items::update_order_item,
    ),
    tags(
        (name = "users", description = "Accounts and sign-in"),
        (name = "tables"),
        (name = "menus"),
        (name = "foods"),
        (name = "orders"),
        (name = "order-items", description = "Line items and per-order billing"),
    )
)]
pub struct ApiDoc;

/// Register every API route on `cfg`. Sign-up, login and `/` are public;
/// everything else needs an access token.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::auth::require_token;

    cfg.route("/", web::get().to(handlers::index))
        .service(
            web::scope("/users")
                .route("/signup", web::post().to(handlers::users::sign_up))
                .route("/login", web::post().to(handlers::users::login))
                .service(
                    web::resource("")
                        .wrap(from_fn(require_token))
                        .route(web::get().to(handlers::users::list_users)),
                )
                .service(
                    web::resource("/{id}")
                        .wrap(from_fn(require_token))
                        .route(web::get().to(handlers::users::get_user)),
                ),
        )
        .service(
            web::scope("/tables")
                .wrap(from_fn(require_token))
                .route("", web::get().to(handlers::tables::list_tables))
                .route("", web::post().to(handlers::tables::create_table))
                .route("/{id}", web::get().to(handlers::tables::get_table))
                .route("/{id}", web::patch().to(handlers::tables::update_table)),
        )
        .service(
            web::scope("/menus")
                .wrap(from_fn(require_token))
                .route("", web::get().to(handlers::menus::list_menus))
                .route("", web::post().to(handlers::menus::create_menu))
                .route("/{id}", web::get().to(handlers::menus::get_menu))
                .route("/{id}", web::patch().to(handlers::menus::update_menu)),
        )
        .service(
            web::scope("/foods")
                .wrap(from_fn(require_token))
                .route("", web::get().to(handlers::foods::list_foods))
                .route("", web::post().to(handlers::foods::create_food))
                .route("/{id}", web::get().to(handlers::foods::get_food))
                .route("/{id}", web::patch().to(handlers::foods::update_food)),
        )
        .service(
            web::scope("/orders")
                .wrap(from_fn(require_token))
                .route("", web::get().to(handlers::orders::list_orders))
                .route("", web::post().to(handlers::orders::create_order))
                .route("/{id}", web::get().to(handlers::orders::get_order))
                .route("/{id}", web::patch().to(handlers::orders::update_order)),
        )
        .service(
            web::scope("/orderItems")
                .wrap(from_fn(require_token))
                .route("", web::get().to(handlers::order_items::list_order_items))
                .route("", web::post().to(handlers::order_items::create_order_items))
                .route("/{id}", web::get().to(handlers::order_items::get_order_item))
                .route(
                    "/{id}",
                    web::patch().to(handlers::order_items::update_order_item),
                ),
        )
        .service(
            web::scope("/orderItems-order")
                .wrap(from_fn(require_token))
                .route(
                    "/{id}",
                    web::get().to(handlers::order_items::get_order_items_by_order),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, settings: &Settings) -> std::io::Result<actix_web::dev::Server> {
    let store = Arc::new(DieselStore::new(pool));
    let credentials = Arc::new(JwtCredentials::new(&settings.secret_key));
    let state = web::Data::new(AppState::new(
        RestaurantService::new(store.clone()),
        UserService::new(store, credentials),
        settings.request_timeout,
    ));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind((settings.host.clone(), settings.port))?
    .run())
}
