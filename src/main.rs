use actix_web::web;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod http;
mod metrics;
mod status;
mod store;

use config::{Config, StorageBackend};
use domain::order::{OrderMutationPolicy, OrderService};
use status::{StatusDirectory, StatusKind, StatusTable};
use store::{
    InMemoryOrderStore, InMemoryProductCatalog, OrderStore, PgOrderStore, PgProductCatalog,
    ProductCatalog,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "STOREFRONT_ORDERS_CONFIG")]
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            Config::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn seeded_directory(config: &Config) -> anyhow::Result<StatusDirectory> {
    let fulfillment = StatusTable::from_names(StatusKind::Fulfillment, &config.statuses.fulfillment)
        .context("fulfillment status table is empty")?;
    let customer_service =
        StatusTable::from_names(StatusKind::CustomerService, &config.statuses.customer_service)
            .context("customer-service status table is empty")?;

    Ok(StatusDirectory::new(fulfillment, customer_service))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront_orders=debug")),
        )
        .init();

    tracing::info!("Starting storefront order service");

    let config = load_config(&args)?;

    // === 1. Storage, catalog and status tables ===
    let (store, catalog, statuses): (Arc<dyn OrderStore>, Arc<dyn ProductCatalog>, Arc<StatusDirectory>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!(
                    products = config.catalog.products.len(),
                    "Using in-memory storage"
                );
                let statuses = Arc::new(seeded_directory(&config)?);
                (
                    Arc::new(InMemoryOrderStore::new(statuses.clone())),
                    Arc::new(InMemoryProductCatalog::new(config.catalog.products.iter().copied())),
                    statuses,
                )
            }
            StorageBackend::Postgres => {
                let url = config
                    .storage
                    .database_url
                    .as_deref()
                    .context("storage.database_url is required for postgres")?;

                let pg = PgOrderStore::connect(url, config.storage.max_connections).await?;
                pg.ensure_schema().await?;
                let statuses = Arc::new(
                    pg.load_status_directory(
                        &config.statuses.fulfillment,
                        &config.statuses.customer_service,
                    )
                    .await?,
                );
                let catalog = PgProductCatalog::new(pg.pool().clone());
                if !catalog.table_exists().await? {
                    anyhow::bail!("products table is missing; it must be provisioned by the catalog service");
                }
                (Arc::new(pg), Arc::new(catalog), statuses)
            }
        };

    if statuses
        .resolve_fulfillment_status_id(&config.statuses.shipping_editable)
        .is_err()
    {
        anyhow::bail!(
            "shipping editable status {:?} is not a known fulfillment status",
            config.statuses.shipping_editable
        );
    }

    // === 2. Order service ===
    let service = Arc::new(OrderService::new(
        store,
        catalog,
        statuses,
        OrderMutationPolicy::new(config.statuses.shipping_editable.clone()),
    ));

    // === 3. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 4. HTTP API ===
    let state = web::Data::new(http::AppState::new(service, metrics));
    http::serve(state, config.bind_address()).await?;

    tracing::info!("Order service stopped");
    Ok(())
}
