//! CLI module for the subscriber
//!
//! Maintenance and subscription management without starting the HTTP
//! server. Subscribe and unsubscribe only start the handshake; the server
//! must be reachable at `SITE_URL` for the hub to complete it.

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{
    configuration::{get_configuration, set_configuration, Config, State},
    dao::SubscriptionStore,
    error::Error,
    handler::SubscriberClient,
    provider::{DatabasePool, HTTP},
};

/// PubSubHubbub subscriber
#[derive(Parser)]
#[command(name = "pshb-subscriber")]
#[command(about = "PubSubHubbub subscriber service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the callback server (default if no command specified)
    Serve,

    /// Apply the schema files
    Migrate,

    /// List stored subscriptions
    List,

    /// Discover the hub of a resource and request a subscription
    Subscribe {
        /// Resource URL advertising its hub
        url: String,
    },

    /// Request removal of an existing subscription
    Unsubscribe {
        /// Resource URL advertising its hub
        url: String,
    },
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

async fn init_database(config: &Config) -> Result<DatabasePool, Error> {
    let database = DatabasePool::new(config).await?;
    State::init_migrations(&database).await?;
    Ok(database)
}

pub async fn run_migrate() -> Result<(), Error> {
    let config = init_config()?;
    init_database(&config).await?;
    info!("Migrations complete");

    Ok(())
}

pub async fn run_list() -> Result<(), Error> {
    let config = init_config()?;
    let database = init_database(&config).await?;

    let items = database.subscription.get_all().await?;
    if items.is_empty() {
        println!("No subscriptions");
    }

    for item in items {
        let expires = item
            .expires
            .map(|value| value.to_rfc3339())
            .unwrap_or_else(|| String::from("-"));
        println!(
            "{:>6}  {:<20}  {:<26}  {}",
            item.id.unwrap_or_default(),
            item.state(),
            expires,
            item.topic
        );
    }

    Ok(())
}

pub async fn run_subscribe(url: &str) -> Result<(), Error> {
    let config = init_config()?;
    let database = init_database(&config).await?;
    let http = HTTP::new(config.clone())?;

    let client = SubscriberClient::new(&config, &database.subscription, &http);
    let subscription = client.subscribe(url).await?;
    info!(
        "Subscription to {} is {}, waiting for hub verification",
        subscription.topic,
        subscription.state()
    );

    Ok(())
}

pub async fn run_unsubscribe(url: &str) -> Result<(), Error> {
    let config = init_config()?;
    let database = init_database(&config).await?;
    let http = HTTP::new(config.clone())?;

    let client = SubscriberClient::new(&config, &database.subscription, &http);
    let subscription = client.unsubscribe(url).await?;
    info!(
        "Unsubscribe from {} requested, waiting for hub verification",
        subscription.topic
    );

    Ok(())
}
