use std::io;

use dotenvy::dotenv;
use restaurant_service::config::Settings;
use restaurant_service::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&settings.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (request timeout {}s)",
        settings.host,
        settings.port,
        settings.request_timeout.as_secs()
    );

    build_server(pool, &settings)?.await
}
