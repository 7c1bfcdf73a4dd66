use clap::Parser;
use tokio::net::TcpListener;

use kitchen_command::{
    build_app,
    config::{Cli, Commands, Config},
    logging::init_logging,
    models::AppState,
    session::Kitchen,
    store::KvStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep guard alive so file logger flushes correctly
    let _log_guards = init_logging(&cli.config);

    if let Some(command) = cli.command {
        return handle_command(command, &cli.config).await;
    }
    let config = cli.config;

    tracing::info!("=== Configuration ===");
    tracing::info!("Bind address: {}", config.bind);
    tracing::info!("Database path: {}", config.database_path.display());
    tracing::info!("Log file: {}", config.log_file.display());
    tracing::info!(
        "CORS origin: {}",
        config.cors_origin.as_deref().unwrap_or("<allow all>")
    );
    tracing::info!("Suggestion threshold: {}", config.suggest_threshold);
    tracing::info!("Import timeout: {}s", config.import_timeout_secs);
    tracing::info!("====================");

    let store = KvStore::open(&config.database_path).await?;
    let kitchen = Kitchen::load(&store).await?;
    let state = AppState::new(store.clone(), kitchen, config.clone())?;

    let app = build_app(state);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    store.close().await;
    Ok(())
}

async fn handle_command(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Reset => {
            let store = KvStore::open(&config.database_path).await?;
            let mut kitchen = Kitchen::load(&store).await?;
            kitchen.reset(&store).await?;
            store.close().await;
            println!("Cleared pantry and recipes in {}", config.database_path.display());
            Ok(())
        }
    }
}
