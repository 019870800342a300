use caishen_oracle::{
    api::{self, AppState},
    judge::JudgeClient,
    ledger::{
        evm::EvmLedger,
        resolver::{NetworkHandle, Networks},
    },
    pipeline::Pipeline,
    settings::Settings,
    store::{SettlementStore, redis::RedisStore},
};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{path::PathBuf, sync::Arc, time::Instant};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "caishen-oracle",
    about = "Off-chain settlement oracle for the CaiShen fortune pool",
    version,
    after_help = r#"Configuration:
    Configuration can be provided via:
    1. Environment variables with CAISHEN__ prefix (e.g., CAISHEN__STORE__URL)
    2. .env file in the current directory
    3. Config file with -c option (see example.config.toml)"#
)]
struct AppArgs {
    /// Path to the configuration file (TOML format)
    ///
    /// If not provided, will attempt to load from environment variables
    #[clap(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse();
    let settings = match args.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::from_env()?,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("{settings}");

    if let Some(addr) = settings.metrics_addr()? {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
    }

    let mut handles = Vec::with_capacity(settings.networks.len());
    for network in &settings.networks {
        let client = EvmLedger::connect(network)?;
        info!(
            network = %network.name,
            chain_id = network.chain_id,
            disbursing = network.signer_key.is_some(),
            "ledger network configured"
        );
        handles.push(NetworkHandle::new(network.clone(), Arc::new(client))?);
    }
    let networks = Networks::new(handles);

    let store: Arc<dyn SettlementStore> = Arc::new(RedisStore::connect(&settings.store.url).await?);
    let judge = JudgeClient::new(settings.judge.clone());
    let pipeline = Pipeline::new(networks, store, judge);

    let state = Arc::new(AppState {
        pipeline,
        started: Instant::now(),
    });

    let listener = tokio::net::TcpListener::bind(settings.listen_addr()?).await?;
    info!(listen = %settings.listen, "CaiShen oracle listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
