use anyhow::Result;
use clap::Parser;
use fleetwatch::{
    alerts::AlertCounter,
    api::{AlertListFetcher, DeviceListFetcher, RestClient},
    cli::Args,
    config::{Config, credential_provider},
    connection::ConnectionManager,
    dispatch::{EventDispatcher, frame_channel},
    history::MetricHistory,
    monitoring::setup_metrics,
    refetch::{ALERTS_PAGE_TRIGGERS, DEVICES_PAGE_TRIGGERS, RefetchCoordinator},
    tracing_setup::setup_tracing,
    ui::StatusView,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args.log_level, args.json_logs)?;

    info!("Starting fleetwatch v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_args(&args)?);
    let creds = credential_provider(&args);

    if config.metrics.enabled {
        setup_metrics(config.metrics.port).await?;
        info!("Metrics server started on port {}", config.metrics.port);
    }

    // Wire the fan-out: each consumer owns disjoint state and registers
    // independently with the dispatcher.
    let (frame_tx, frame_rx) = frame_channel();
    let mut dispatcher = EventDispatcher::new();

    let alert_counter = AlertCounter::new();
    alert_counter.attach(&mut dispatcher);

    let metric_history = MetricHistory::new();
    metric_history.attach(&mut dispatcher);

    let rest = Arc::new(RestClient::new(config.api.base_url.clone(), creds.clone())?);
    let alerts_page = RefetchCoordinator::new(
        Arc::new(AlertListFetcher::new(rest.clone())),
        ALERTS_PAGE_TRIGGERS.to_vec(),
    );
    alerts_page.attach(&mut dispatcher);
    let devices_page = RefetchCoordinator::new(
        Arc::new(DeviceListFetcher::new(rest.clone())),
        DEVICES_PAGE_TRIGGERS.to_vec(),
    );
    devices_page.attach(&mut dispatcher);

    let mut manager = ConnectionManager::new(config.clone(), creds, frame_tx);
    let state_rx = manager.state();
    let shutdown = manager.shutdown_handle();

    tokio::spawn(dispatcher.run(frame_rx));
    tokio::spawn(
        StatusView::new(
            state_rx,
            alert_counter,
            metric_history,
            config.status_interval,
        )
        .run(),
    );

    // initial authoritative snapshots; push events refresh them from here on
    alerts_page.refresh();
    devices_page.refresh();

    let mut run = tokio::spawn(async move { manager.run().await });
    tokio::select! {
        result = &mut run => {
            if let Err(e) = result? {
                error!("push connection error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            shutdown.shutdown();
            run.await??;
        }
    }

    info!("fleetwatch stopped");
    Ok(())
}
