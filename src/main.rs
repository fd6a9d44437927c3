//! geolocate - IP geolocation API with provider fallback
//!
//! This is the composition root that wires together all the components.

use clap::Parser;
use geolocate::adapters::inbound::{run_lookup, ApiServer, ApiState};
use geolocate::adapters::outbound::http_providers;
use geolocate::application::{LocationService, ProviderRegistry};
use geolocate::cli::{Cli, Commands};
use geolocate::config::{load_config, Config};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let mut cfg = load_config()?;

    // Setup logging; stderr keeps lookup output clean on stdout
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve { listen: None }) {
        Commands::Serve { listen } => {
            if let Some(addr) = listen {
                cfg.listen_addr = addr;
            }
            serve(cfg).await
        }
        Commands::Lookup { ips, provider, json } => {
            let service = build_service(&cfg)?;
            let report = run_lookup(&service, &ips, provider.as_deref()).await;

            let mut stdout = std::io::stdout().lock();
            if json {
                report.write_json(&mut stdout)?;
            } else {
                report.write_text(&mut stdout)?;
            }

            if report.located() == 0 {
                anyhow::bail!("none of the {} addresses could be located", ips.len());
            }
            Ok(())
        }
    }
}

// ===== COMPOSITION ROOT =====

/// Outbound adapters over one shared connection pool, and the service on top.
fn build_service(cfg: &Config) -> anyhow::Result<LocationService> {
    let client = reqwest::Client::builder().build()?;
    let registry = ProviderRegistry::new(http_providers(client, cfg.http_timeout()));

    let service = cfg.credentials().into_iter().fold(
        LocationService::new(registry).with_fallback_delay(cfg.fallback_delay()),
        |service, (kind, params)| {
            tracing::debug!("credentials configured for {}", kind);
            service.with_credentials(kind, params)
        },
    );
    Ok(service)
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    tracing::info!(
        "starting geolocate listen={} providers={}",
        cfg.listen_addr,
        cfg.service_providers.join(",")
    );

    for name in cfg.unknown_service_providers() {
        tracing::warn!("configured provider {} is unknown and will always fail", name);
    }

    let service = build_service(&cfg)?;

    let state = ApiState::new(Arc::new(service))
        .with_providers(cfg.service_providers.clone())
        .with_trust_forwarded_for(cfg.trust_forwarded_for);

    let server = ApiServer::new(cfg.listen_addr.clone(), state).with_cors(cfg.cors_enabled);

    server.run().await
}
