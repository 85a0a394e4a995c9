use crate::app_config::AppConfig;
use crate::provisioning::{ProductSetup, ProvisioningPlan};
use crate::registry::{DeviceRegistry, InMemoryRegistry};
use std::sync::Arc;
use tracing::info;

mod app_config;
mod domain;
mod extensions;
mod provisioning;
mod registry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let registry = Arc::new(InMemoryRegistry::new());

    let setup = ProductSetup::from_config(&config).await?;
    provisioning::setup_product(registry.as_ref(), &setup).await?;
    info!("✅  Product '{}' is ready", setup.info.id);

    let plan = ProvisioningPlan::from_config(&config)?;
    let handle = provisioning::spawn(registry.clone(), plan);
    info!("🔥 {} is up and running, provisioning in the background", env!("CARGO_PKG_NAME"));

    let report = handle.wait().await?;
    info!(
        "✅  Provisioned {} device(s), {} child device(s) of '{}', {} device(s) in the registry",
        report.registered,
        report.children.registered,
        report.children.parent_id,
        registry.device_count().await
    );

    Ok(())
}
