use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};

use pshb_subscriber::{
    cli::{self, Cli, Commands},
    configuration::{AppState, Config, State},
    error::Error,
    provider::{DatabasePool, HTTP},
    server,
    sink::{ContentSink, SpoolSink, TracingSink},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => serve().await,
        Some(Commands::Migrate) => cli::run_migrate().await,
        Some(Commands::List) => cli::run_list().await,
        Some(Commands::Subscribe { url }) => cli::run_subscribe(&url).await,
        Some(Commands::Unsubscribe { url }) => {
            cli::run_unsubscribe(&url).await
        },
    }
}

async fn serve() -> Result<(), Error> {
    let (config, database) = match init().await {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let http = HTTP::new(config.clone())?;
    let sink = init_sink(&config);

    let state = State::new(config, database, http, sink).await?;
    let app_state = AppState::new(state);

    server::server_task(&app_state).await
}

async fn init() -> Result<(Config, DatabasePool), Error> {
    let config = cli::init_config()?;
    let database = DatabasePool::new(&config).await?;
    Ok((config, database))
}

fn init_sink(config: &Config) -> Arc<dyn ContentSink> {
    match &config.spool_directory {
        Some(directory) => {
            info!("Spooling accepted pushes to {}", directory);
            Arc::new(SpoolSink::new(directory))
        },
        None => Arc::new(TracingSink),
    }
}
