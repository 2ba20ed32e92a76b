use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Context};
use serde_json::json;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use smspay_common::traits::api::EligibilityApi;
use smspay_common::traits::purchase_traits::IntervalSource;
use smspay_core::config::AppConfig;
use smspay_core::eventbus::EventBus;
use smspay_core::network::RestEligibilityClient;
use smspay_core::purchase::{PurchaseContext, PurchaseDeps, PurchaseDriver};
use smspay_core::repositories::{ProgressRepository, SqliteProgressRepository};
use smspay_core::services::catalogue::{StaticCatalogue, TemplateMessageGenerator};
use smspay_core::services::intervals::UniformIntervalGenerator;
use smspay_core::services::transmitter::LoopbackTransmitter;
use smspay_core::{Database, DefaultHttpClient};

mod offline;
use offline::OfflineEligibility;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug, Clone)]
#[command(name = "smspay")]
#[command(author, version, about = "SMS purchase simulator")]
struct Args {
    /// Config file (defaults to $SMSPAY_CONFIG, then ./smspay.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer eligibility and receipt checks locally instead of calling the service
    #[arg(long, default_value = "false")]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Buy (or resume buying) a product, printing events as JSON lines
    Purchase {
        product_id: String,

        /// Cancel the purchase after this many seconds
        #[arg(long)]
        cancel_after: Option<u64>,
    },
    /// Show stored progress for a product
    Status { product_id: String },
    /// List configured products
    Products,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("smspay=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("loading configuration")?;

    let result = match args.command.clone() {
        Command::Purchase { product_id, cancel_after } => {
            run_purchase(&config, args.offline, &product_id, cancel_after).await
        }
        Command::Status { product_id } => show_status(&config, &product_id).await,
        Command::Products => list_products(&config).await,
    };
    if let Err(e) = &result {
        error!("{:?}", e);
    }
    result
}

/// `create_if_missing` creates the database file, not its directory.
fn ensure_db_dir(database_url: &str) -> anyhow::Result<()> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    if path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<SqliteProgressRepository> {
    ensure_db_dir(&config.database_url)?;
    let db = Database::new(&config.database_url).await?;
    db.migrate().await?;
    Ok(SqliteProgressRepository::new(db.pool().clone()))
}

async fn run_purchase(
    config: &AppConfig,
    offline: bool,
    product_id: &str,
    cancel_after: Option<u64>,
) -> anyhow::Result<()> {
    if !config.test_mode {
        bail!("this host has no SMS radio; set test_mode to use the loopback transmitter");
    }
    let store = open_store(config).await?;

    let api: Arc<dyn EligibilityApi> = if offline {
        Arc::new(OfflineEligibility)
    } else {
        let http = DefaultHttpClient::with_timeout(HTTP_TIMEOUT)?;
        Arc::new(RestEligibilityClient::new(http, &config.api_endpoint, config.sdk_key.clone())?)
    };

    let intervals: Box<dyn IntervalSource> = match config.intervals.seed {
        Some(seed) => Box::new(UniformIntervalGenerator::seeded(
            config.intervals.min_secs,
            config.intervals.max_secs,
            seed,
        )?),
        None => Box::new(UniformIntervalGenerator::from_os_rng(
            config.intervals.min_secs,
            config.intervals.max_secs,
        )?),
    };

    let ctx = PurchaseContext {
        catalogue: Arc::new(StaticCatalogue::new(config.products.clone())?),
        messages: Arc::new(TemplateMessageGenerator),
        destinations: config.destination_range,
        network: config.network.clone(),
        settings: config.purchase.clone(),
        seed: config.intervals.seed,
    };

    let bus = EventBus::new();
    let mut events = bus.subscribe(None).await;
    let driver = PurchaseDriver::spawn(
        ctx,
        PurchaseDeps {
            store: Arc::new(store),
            transmitter: Arc::new(LoopbackTransmitter),
            api,
            intervals,
            bus: bus.clone(),
        },
    );

    info!("Purchasing '{}' (offline={})", product_id, offline);
    driver.start(product_id)?;

    let mut cancel_at = cancel_after.map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        let deadline = cancel_at;
        tokio::select! {
            maybe = events.recv() => {
                let Some(event) = maybe else {
                    warn!("Event stream closed before the purchase finished");
                    break;
                };
                println!("{}", serde_json::to_string(&event)?);
                if event.is_terminal() {
                    break;
                }
            }
            _ = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                info!("--cancel-after elapsed; cancelling");
                cancel_at = None;
                driver.cancel();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; cancelling");
                driver.cancel();
            }
        }
    }

    info!("Final state: {:?}", driver.state());
    driver.shutdown().await;
    bus.shutdown();
    Ok(())
}

async fn show_status(config: &AppConfig, product_id: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let record = store.get_progress(product_id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn list_products(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    for product in &config.products {
        let record = store.get_progress(&product.product_id).await?;
        let line = json!({
            "product_id": product.product_id,
            "required_sms_count": product.required_sms_count,
            "sent_count": record.sent_count,
            "redeemed": record.redeemed,
        });
        println!("{line}");
    }
    Ok(())
}
