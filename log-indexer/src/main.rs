use std::env;

use dotenv::dotenv;
use log_indexer::{shipper, AppError, Dependencies, Settings};
use log_indexer_hook::Level;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let deps = Dependencies::new(&settings).await?;

    let shutdown = deps.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, cancelling backend calls");
            shutdown.cancel();
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let shipped = shipper::ship(stdin, &deps.logger, Level::Info, &deps.shutdown).await?;

    let indices = deps.hook.provisioned_indices().await;
    info!(
        shipped,
        indices = ?indices,
        "Log indexer finished"
    );

    deps.hook.cancel();
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Log indexer failed");
        std::process::exit(1);
    }
}
