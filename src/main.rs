use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use viewing_dashboard::{load_datasets, router, AppState, Dashboard, DashboardConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DashboardConfig::from_env();
    let datasets = match load_datasets(&config.paths).await {
        Ok(datasets) => datasets,
        Err(err) => {
            error!("cannot start dashboard: {err}");
            return Err(err.into());
        }
    };

    let dashboard = Dashboard::build(config.title, datasets);
    info!(
        "dashboard ready: {} regions, sessions {}",
        dashboard.region_summary.len(),
        dashboard.date_range_label()
    );
    let app = router(AppState::new(dashboard));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
