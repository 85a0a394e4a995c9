use crate::domain::metadata::DeviceMetadata;
use crate::domain::{ConfigValue, DeviceInfo, ProductInfo};
use crate::registry::RegistryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Key/value configuration scoped to a single product or device.
#[async_trait]
pub trait ConfigOperation: Debug + Send + Sync {
    async fn put(&self, key: &str, value: ConfigValue) -> Result<(), RegistryError>;

    async fn put_all(&self, values: HashMap<String, ConfigValue>) -> Result<(), RegistryError>;

    async fn get(&self, key: &str) -> Option<ConfigValue>;

    async fn configuration(&self) -> HashMap<String, ConfigValue>;
}

#[async_trait]
pub trait ProductOperation: ConfigOperation {
    fn id(&self) -> &str;

    /// Replaces the stored product attributes, last write wins.
    async fn update(&self, info: ProductInfo) -> Result<(), RegistryError>;

    /// Validates the metadata document and swaps it in as a whole.
    async fn update_metadata(&self, metadata: &str) -> Result<(), RegistryError>;

    async fn info(&self) -> Option<ProductInfo>;

    async fn metadata(&self) -> Option<Arc<DeviceMetadata>>;
}

#[async_trait]
pub trait DeviceOperation: ConfigOperation {
    fn id(&self) -> &str;

    async fn info(&self) -> DeviceInfo;

    async fn registered_at(&self) -> DateTime<Utc>;

    async fn updated_at(&self) -> DateTime<Utc>;
}

/// Registry of products and devices.
///
/// Products are created on first access. Devices are upserted on registration: the stored
/// [`DeviceInfo`] is replaced and configuration written earlier is kept. A parent device does
/// not need to exist when one of its children is registered.
#[async_trait]
pub trait DeviceRegistry: Debug + Send + Sync {
    async fn product(&self, product_id: &str) -> Result<Arc<dyn ProductOperation>, RegistryError>;

    async fn register(&self, device: DeviceInfo) -> Result<Arc<dyn DeviceOperation>, RegistryError>;

    async fn device(&self, device_id: &str) -> Option<Arc<dyn DeviceOperation>>;

    /// Ids of the devices currently registered with `parent_id` as their parent, sorted.
    async fn children(&self, parent_id: &str) -> Vec<String>;

    async fn device_count(&self) -> usize;
}
