use std::{env, num::NonZeroU32, str::FromStr, sync::Arc};

use log::LevelFilter;

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server: database connection details,
/// server host and port, worker threads, CORS, logging, throttling and
/// pagination settings.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Upper bound of pooled database connections.
    pub db_max_connections: u32,
    /// How long to keep retrying the first database connection.
    pub db_connect_timeout_secs: u64,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// Seconds granted to in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing). `*` allows any.
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Minimum level written by the logger.
    pub log_level: LevelFilter,
    /// Log file path; `None` keeps logs on stdout only.
    pub log_file: Option<String>,
    /// Requests per second granted to a single client address.
    pub rate_limit_per_second: NonZeroU32,
    /// Take the client address from `Forwarded` / `X-Forwarded-For`.
    /// Only safe behind a reverse proxy that sets these headers itself.
    pub trust_proxy_headers: bool,
    /// Page size used when a listing does not ask for one.
    pub default_page_size: i64,
    /// Largest page size a listing may ask for.
    pub max_page_size: i64,
}

#[derive(Clone, Debug)]
/// Connection parameters used to build a database URL when none is given.
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl PostgresConfig {
    pub fn to_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads `.env` first when present. Every setting has a default, so this
    /// never fails; values that cannot be parsed fall back to their defaults.
    ///
    /// # Environment Variables
    ///
    /// - `ENVIRONMENT` / `APP_ENV`: "development" or "production" (default: "development")
    /// - `DATABASE_URL` / `POSTGRES_DSN`: connection string; otherwise built from
    ///   `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER` and `DB_PASSWORD`
    /// - `DB_MAX_CONNECTIONS` (default: 10), `DB_CONNECT_TIMEOUT_SECS` (default: 30)
    /// - `IP` (default: "0.0.0.0"), `PORT` / `APP_PORT` (default: 8080)
    /// - `WORKERS` (default: 4), `SHUTDOWN_TIMEOUT_SECS` (default: 10)
    /// - `CORS_ALLOWED_ORIGIN` (default: "*")
    /// - `ENABLE_CONSOLE_LOGGING` (default: true), `LOG_LEVEL` (default: "debug"),
    ///   `LOG_FILE` (default: "subtracker.log", empty disables the file)
    /// - `RATE_LIMIT_PER_SECOND` (default: 50), `TRUST_PROXY_HEADERS` (default: false)
    /// - `PAGE_SIZE_DEFAULT` (default: 10), `PAGE_SIZE_MAX` (default: 100)
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

        let database_url = var(&["DATABASE_URL", "POSTGRES_DSN"]).unwrap_or_else(|| {
            PostgresConfig {
                host: var(&["DB_HOST"]).unwrap_or_else(|| "db".to_string()),
                port: parse_or(var(&["DB_PORT"]), 5432),
                name: var(&["DB_NAME"]).unwrap_or_else(|| "subtracker".to_string()),
                user: var(&["DB_USER"]).unwrap_or_else(|| "postgres".to_string()),
                password: var(&["DB_PASSWORD"]).unwrap_or_else(|| "supersecret".to_string()),
            }
            .to_url()
        });

        let default_page_size = parse_or(var(&["PAGE_SIZE_DEFAULT"]), 10_i64).max(1);

        Config {
            environment: var(&["ENVIRONMENT", "APP_ENV"])
                .unwrap_or_else(|| "development".to_string()),
            database_url,
            db_max_connections: parse_or(var(&["DB_MAX_CONNECTIONS"]), 10),
            db_connect_timeout_secs: parse_or(var(&["DB_CONNECT_TIMEOUT_SECS"]), 30),
            server_host: var(&["IP"]).unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(var(&["PORT", "APP_PORT"]), 8080),
            num_workers: parse_or(var(&["WORKERS"]), 4),
            shutdown_timeout_secs: parse_or(var(&["SHUTDOWN_TIMEOUT_SECS"]), 10),
            cors_allowed_origin: var(&["CORS_ALLOWED_ORIGIN"]).unwrap_or_else(|| "*".to_string()),
            console_logging_enabled: var(&["ENABLE_CONSOLE_LOGGING"])
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                == "true",
            log_level: parse_or(var(&["LOG_LEVEL"]), LevelFilter::Debug),
            log_file: match var(&["LOG_FILE"]) {
                Some(path) if path.trim().is_empty() => None,
                Some(path) => Some(path),
                None => Some("subtracker.log".to_string()),
            },
            rate_limit_per_second: parse_or(
                var(&["RATE_LIMIT_PER_SECOND"]),
                NonZeroU32::new(50).unwrap_or(NonZeroU32::MIN),
            ),
            trust_proxy_headers: var(&["TRUST_PROXY_HEADERS"])
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true")),
            default_page_size,
            max_page_size: parse_or(var(&["PAGE_SIZE_MAX"]), 100_i64).max(default_page_size),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
