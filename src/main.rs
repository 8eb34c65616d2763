//! Storefront gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                  GATEWAY                      │
//!     Browser Request      │  ┌─────────┐   ┌─────────────┐   ┌─────────┐ │
//!     ─────────────────────┼─▶│  http   │──▶│ route table │──▶│translate│ │
//!                          │  │ server  │   │  (routing)  │   │  path   │ │
//!                          │  └─────────┘   └─────────────┘   └────┬────┘ │
//!                          │                                      ▼      │
//!     Browser Response     │  ┌──────────┐               ┌─────────────┐ │      catalog
//!     ◀────────────────────┼──│normalize │◀──────────────│  forwarder  │◀┼────  identity
//!                          │  │ response │               │ (one call)  │ │      fulfillment
//!                          │  └──────────┘               └─────────────┘ │      analytics
//!                          └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use storefront_gateway::admin::{setup_admin_router, AdminState};
use storefront_gateway::config::{load_config, LoadedConfig};
use storefront_gateway::lifecycle::{self, signals, Shutdown};
use storefront_gateway::observability::{logging, metrics};
use storefront_gateway::{HttpServer, RouteTable};

#[derive(Parser)]
#[command(name = "storefront-gateway")]
#[command(about = "Routes storefront and admin API calls to backend services", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Validate the configuration and route table, then exit
    Check,
    /// Print the compiled route table
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let loaded = load_config(cli.config.as_deref())?;
    let config = &loaded.config;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(loaded).await,
        Commands::Check => {
            // load_config already rejected anything invalid.
            println!("configuration OK: {} routes", config.routes.len());
            Ok(())
        }
        Commands::Routes => {
            let table = RouteTable::build(&config.routes, &config.services)?;
            for route in table.routes() {
                let methods: Vec<&str> = route.methods.iter().map(|m| m.as_str()).collect();
                println!(
                    "{:<24} {:<22} {:<36} {:<12} {}",
                    route.name,
                    methods.join(","),
                    route.path,
                    route.service,
                    route.translation
                );
            }
            Ok(())
        }
    }
}

async fn serve(loaded: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let LoadedConfig { config, overrides } = loaded;
    logging::init_logging(&config.observability)?;

    tracing::info!("storefront-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );
    for setting in &overrides {
        tracing::info!(setting = %setting, "Overridden from environment");
    }
    for (service, base_url) in config.services.iter() {
        tracing::info!(service = %service, base_url = %base_url, "Backend service");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone())?;

    if config.admin.enabled {
        let admin = setup_admin_router(AdminState {
            routes: server.routes(),
            services: Arc::new(config.services.clone()),
            api_key: Arc::from(config.admin.api_key.as_str()),
        });
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, admin)
                .with_graceful_shutdown(lifecycle::shutdown::wait(admin_shutdown))
                .await
            {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
