use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::time::{Instant, sleep};

pub mod store;
pub mod subscription;

pub mod models {
    pub mod subscription;
}

pub mod dtos {
    pub mod subscription;
}

const RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Pool tuning taken from the server configuration.
pub struct PoolSettings {
    pub require_ssl: bool,
    pub max_connections: u32,
    /// How long to keep retrying while the database is not reachable yet.
    pub connect_timeout: Duration,
}

pub async fn setup(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let url = url::Url::parse(database_url)?;
    let db_name = url.path().trim_start_matches('/');
    let username = url.username();
    let password = url.password().unwrap_or("");
    let host = url.host_str().unwrap_or("localhost");
    let port = url.port().unwrap_or(5432);

    let admin_url = format!(
        "postgresql://{}:{}@{}:{}/postgres",
        username, password, host, port
    );

    let mut admin_options = PgConnectOptions::from_str(&admin_url)?;
    if settings.require_ssl {
        admin_options = admin_options.ssl_mode(PgSslMode::Require);
    }

    let admin_pool = connect_with_retry(admin_options, 1, settings.connect_timeout).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin_pool)
            .await?;

    if !exists {
        log::info!("Creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\"")))
            .execute(&admin_pool)
            .await?;
    }

    admin_pool.close().await;

    let mut options = PgConnectOptions::from_str(database_url)?;
    if settings.require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }
    let pool = connect_with_retry(options, settings.max_connections, settings.connect_timeout).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Connected to database {} on {}:{}", db_name, host, port);

    Ok(Arc::new(pool))
}

async fn connect_with_retry(
    options: PgConnectOptions,
    max_connections: u32,
    timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let deadline = Instant::now() + timeout;
    loop {
        let attempt = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.clone())
            .await;

        match attempt {
            Ok(pool) => return Ok(pool),
            Err(err) if Instant::now() + RETRY_INTERVAL < deadline => {
                log::warn!(
                    "Database is not reachable yet ({}), retrying in {}s",
                    err,
                    RETRY_INTERVAL.as_secs()
                );
                sleep(RETRY_INTERVAL).await;
            }
            Err(err) => return Err(err),
        }
    }
}
