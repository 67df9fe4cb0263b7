use clap::{Parser, Subcommand};
use pickupboard_core::{AppConfig, SnapshotSource};
use pickupboard_scraper::{SnapshotBuilder, UpstreamSnapshotBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pickupboard-cli")]
#[command(about = "Pickup availability board command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild the snapshot from the storefront and store it durably.
    Refresh {
        /// Rebuild and print a summary without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the durable snapshot as JSON.
    Snapshot {
        #[arg(long)]
        pretty: bool,
    },
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Migrate,
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = pickupboard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Refresh { dry_run }) => run_refresh(&config, dry_run).await?,
        Some(Commands::Snapshot { pretty }) => print_snapshot(&config, pretty).await?,
        Some(Commands::Db {
            command: DbCommands::Migrate,
        }) => {
            let pool = pickupboard_db::connect_pool_from_config(&config).await?;
            let applied = pickupboard_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Some(Commands::Db {
            command: DbCommands::Ping,
        }) => {
            let pool = pickupboard_db::connect_pool_from_config(&config).await?;
            pickupboard_db::health_check(&pool).await?;
            println!("database ok");
        }
        None => println!("pickupboard-cli: try `refresh`, `snapshot` or `db migrate`"),
    }

    Ok(())
}

/// One rebuild-and-persist pass; meant for an external cron.
async fn run_refresh(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!(dry_run, "refreshing availability snapshot");
    let builder = UpstreamSnapshotBuilder::new(config.upstream.clone())?;
    let snapshot = builder.build().await?.with_source(SnapshotSource::Fresh);

    println!(
        "models={} stores={} records={} available={}",
        snapshot.models.len(),
        snapshot.stores.len(),
        snapshot.availability.len(),
        snapshot.available_count()
    );

    if dry_run {
        return Ok(());
    }

    let pool = pickupboard_db::connect_pool_from_config(config).await?;
    let expires_at = pickupboard_db::put_snapshot(
        &pool,
        pickupboard_db::LATEST_SNAPSHOT_KEY,
        &snapshot,
        config.snapshot_ttl_secs,
    )
    .await?;
    tracing::info!(key = pickupboard_db::LATEST_SNAPSHOT_KEY, %expires_at, "snapshot stored");
    println!("stored snapshot, expires {expires_at}");

    let purged = pickupboard_db::delete_expired_snapshots(&pool).await?;
    if purged > 0 {
        tracing::info!(purged, "expired snapshot rows removed");
    }
    Ok(())
}

async fn print_snapshot(config: &AppConfig, pretty: bool) -> anyhow::Result<()> {
    let pool = pickupboard_db::connect_pool_from_config(config).await?;
    let Some(snapshot) =
        pickupboard_db::get_snapshot(&pool, pickupboard_db::LATEST_SNAPSHOT_KEY).await?
    else {
        anyhow::bail!("no unexpired snapshot stored");
    };

    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests;
