use crate::app_config::{AppConfig, Topics};
use crate::domain::{ConfigValue, DeviceConfigKey, ProductInfo};
use crate::registry::{DeviceRegistry, ProductOperation, RegistryError};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

const DEFAULT_METADATA: &str = include_str!("../../resources/metadata/test-device.json");

#[derive(Clone, Debug)]
pub struct ProductSetup {
    pub info: ProductInfo,
    pub metadata: String,
    pub topics: Topics,
}

impl ProductSetup {
    pub async fn from_config(config: &AppConfig) -> Result<Self, ProductSetupError> {
        let product = config.product();
        let metadata = match product.metadata_path() {
            Some(path) => load_metadata(path).await?,
            None => DEFAULT_METADATA.to_string(),
        };

        Ok(ProductSetup {
            info: ProductInfo::new(product.id(), product.name(), product.protocol()),
            metadata,
            topics: product.topics().clone(),
        })
    }
}

async fn load_metadata(path: &Path) -> Result<String, ProductSetupError> {
    fs::read_to_string(path).await.map_err(|source| ProductSetupError::Io {
        source,
        path: path.display().to_string(),
    })
}

/// Creates or updates the product, its metadata and its topic configuration.
///
/// The steps are applied one after the other without any atomicity across them, a concurrent
/// reader can observe the new product info together with the previous metadata. A failing
/// step leaves the earlier steps applied, the whole setup can simply be run again.
#[instrument(skip_all, fields(product_id = %setup.info.id))]
pub async fn setup_product(registry: &dyn DeviceRegistry, setup: &ProductSetup) -> Result<Arc<dyn ProductOperation>, ProductSetupError> {
    info!("📦 Setting up product '{}'...", setup.info.name);

    let operation = registry.product(&setup.info.id).await?;
    operation.update(setup.info.clone()).await?;
    operation.update_metadata(&setup.metadata).await?;
    operation.put_all(topic_configuration(&setup.topics)).await?;

    if let Some(metadata) = operation.metadata().await {
        if let Ok(json) = metadata.to_json() {
            debug!(metadata = %json, "Stored metadata '{}'", metadata.id);
        }
    }
    info!("📦 Setting up product '{}'... OK", setup.info.name);
    Ok(operation)
}

fn topic_configuration(topics: &Topics) -> HashMap<String, ConfigValue> {
    [
        (DeviceConfigKey::EventTopic, &topics.event),
        (DeviceConfigKey::DeviceConnectTopic, &topics.device_connect),
        (DeviceConfigKey::DeviceDisconnectTopic, &topics.device_disconnect),
        (DeviceConfigKey::ChildDeviceConnectTopic, &topics.child_device_connect),
        (DeviceConfigKey::ChildDeviceDisconnectTopic, &topics.child_device_disconnect),
        (DeviceConfigKey::FunctionReplyTopic, &topics.function_reply),
    ]
    .into_iter()
    .map(|(key, names)| (key.key().to_string(), ConfigValue::from(names.clone())))
    .collect()
}

#[derive(Error, Debug)]
pub enum ProductSetupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("could not read metadata from '{path}': {source}")]
    Io { source: io::Error, path: String },
}
