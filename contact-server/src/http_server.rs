// Contact HTTP server using Axum

use std::sync::Arc;

use anyhow::Context;
use contact_lakehouse::{DeltaStore, LakehouseConfig, MaintenanceScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contact_server::config::ServerConfig;
use contact_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "contact_server=debug,contact_lakehouse=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let lakehouse = LakehouseConfig::new(&config.data_dir);
    if lakehouse.uses_dev_secret() {
        tracing::warn!("CONTACT_JWT_SECRET not set, using the development signing secret");
    }

    let store = Arc::new(
        DeltaStore::new(lakehouse)
            .await
            .with_context(|| format!("opening lakehouse at {}", config.data_dir.display()))?,
    );

    let state = AppState::new(store);
    if let Some(admin) = &config.bootstrap_admin {
        state.ensure_admin(admin).await.context("bootstrapping SuperAdmin")?;
    }

    let mut scheduler = MaintenanceScheduler::new(state.auth.clone(), state.contacts.clone());
    scheduler.start();

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Contact HTTP server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.stop();
    Ok(())
}
