use std::{env, fs, ops::Deref, path::Path, str::FromStr, sync::Arc};

use url::Url;

use crate::{
    dao::migration_files, error::Error, provider::DatabasePool,
    provider::HTTP, sink::ContentSink,
};

pub const DEFAULT_CALLBACK_PATH: &str = "/pubsubhubbub/callback";
pub const CALLBACK_TOPIC_PARAM: &str = "topic";

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub http: HTTP,
    pub sink: Arc<dyn ContentSink>,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        http: HTTP,
        sink: Arc<dyn ContentSink>,
    ) -> Result<State, Error> {
        Self::init_migrations(&database).await?;
        Ok(Self {
            config,
            database,
            http,
            sink,
        })
    }

    pub async fn init_migrations(database: &DatabasePool) -> Result<(), Error> {
        let dir = env!("CARGO_MANIFEST_DIR");

        for file in migration_files(dir)? {
            let data = fs::read_to_string(&file)?;
            sqlx::raw_sql(data.as_str()).execute(&database.pool).await?;
            tracing::info!("Applied schema file {}", file.display());
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub port: u16,
    pub site_url: String,
    pub callback_path: String,
    pub timeout: u64,
    pub max_connections: u32,
    pub max_payload_size: usize,
    pub default_lease_seconds: i64,
    pub spool_directory: Option<String>,
}

impl Config {
    /// The URL the hub calls for both the handshake and push delivery of
    /// `topic`.
    pub fn callback_endpoint(&self) -> Result<Url, Error> {
        let base = self.site_url.trim_end_matches('/');
        let path = self.callback_path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    /// Callback handed to the hub for `topic`.
    pub fn callback_url(&self, topic: &str) -> Result<String, Error> {
        let mut url = self.callback_endpoint()?;

        url.query_pairs_mut()
            .append_pair(CALLBACK_TOPIC_PARAM, topic);

        Ok(url.to_string())
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let database_url = env::var("DATABASE_URL")?;
    let server_host = env::var("SERVER_HOST")?;
    let port: u16 = env::var("PORT")?.parse()?;
    let site_url = env::var("SITE_URL")?;
    Url::parse(&site_url).map_err(|e| {
        Error::ConfigurationError(format!("SITE_URL {}: {}", site_url, e))
    })?;

    let callback_path =
        env_or("CALLBACK_PATH", String::from(DEFAULT_CALLBACK_PATH))?;
    if !callback_path.starts_with('/') {
        return Err(Error::ConfigurationError(format!(
            "CALLBACK_PATH must start with '/': {}",
            callback_path
        )));
    }

    let timeout = env_or("TIMEOUT", 30)?;
    let max_connections = env_or("MAX_CONNECTIONS", 20)?;
    let max_payload_size = env_or("MAX_PAYLOAD_SIZE", 1024 * 1024)?;
    let default_lease_seconds = env_or("DEFAULT_LEASE_SECONDS", 86400)?;
    let spool_directory = env::var("SPOOL_DIRECTORY")
        .ok()
        .filter(|value| !value.is_empty());

    let config = Config {
        database_url,
        server_host,
        port,
        site_url,
        callback_path,
        timeout,
        max_connections,
        max_payload_size,
        default_lease_seconds,
        spool_directory,
    };

    Ok(config)
}

fn env_or<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| {
            Error::ConfigurationError(format!("{}: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    // Plain environment variables are enough when no file is deployed.
    if !Path::new(&path).exists() {
        return Ok(());
    }

    let config_string = fs::read_to_string(path)?;
    parse_config_string(config_string)?;

    Ok(())
}

fn parse_config_string(config: String) -> Result<(), Error> {
    for (key, value) in parse_pairs(&config) {
        env::set_var(key, value);
    }

    Ok(())
}

fn parse_pairs(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
