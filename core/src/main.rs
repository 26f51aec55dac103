mod cors;

use std::{io, sync::Arc, time::Duration};

use actix_web::{
    App, HttpServer,
    web::{self},
};
use api_subs::Validator;
use common::env_config::Config;
use db::{
    PoolSettings,
    store::{PgStore, SubscriptionStore},
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // init logger
    logger::setup(config.log_level, config.log_file.as_deref())
        .map_err(|err| io::Error::other(format!("Failed to set up logger: {}", err)))?;

    // init db connection
    let pool = db::setup(
        &config.database_url,
        &PoolSettings {
            require_ssl: config.is_production(),
            max_connections: config.db_max_connections,
            connect_timeout: Duration::from_secs(config.db_connect_timeout_secs),
        },
    )
    .await
    .map_err(|err| {
        log::error!("Failed to set up database: {}", err);
        io::Error::other(err.to_string())
    })?;

    let store: Arc<dyn SubscriptionStore> = Arc::new(PgStore::new(pool));
    let validator = web::Data::new(Validator::new(
        config.default_page_size,
        config.max_page_size,
    ));

    // shared by every worker
    let limiter = limiter::client_middleware(
        config.rate_limit_per_second,
        config.trust_proxy_headers,
    );

    log::info!(
        "Starting {} server on {}:{}",
        config.environment,
        config.server_host,
        config.server_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(store.clone()))
            .app_data(validator.clone())
            .app_data(api_subs::json_config())
            .app_data(api_subs::query_config())
            .wrap(limiter.clone()) // 3rd
            .wrap(cors::middleware(&config_data.cors_allowed_origin)) // 2nd
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 1st
            .service(api_subs::mount_subs())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .shutdown_timeout(config.shutdown_timeout_secs)
    .run()
    .await?;

    log::info!("Server stopped");
    Ok(())
}
