use crate::domain::metadata::{self, DeviceMetadata};
use crate::domain::{ConfigValue, ProductInfo};
use crate::registry::{ConfigOperation, ProductOperation, RegistryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct ProductEntry {
    id: String,
    state: RwLock<ProductState>,
}

#[derive(Debug, Default)]
struct ProductState {
    info: Option<ProductInfo>,
    metadata: Option<Arc<DeviceMetadata>>,
    configuration: HashMap<String, ConfigValue>,
}

impl ProductEntry {
    pub fn new(id: String) -> Self {
        ProductEntry {
            id,
            state: RwLock::new(ProductState::default()),
        }
    }
}

#[async_trait]
impl ConfigOperation for ProductEntry {
    async fn put(&self, key: &str, value: ConfigValue) -> Result<(), RegistryError> {
        self.state.write().await.configuration.insert(key.to_string(), value);
        Ok(())
    }

    async fn put_all(&self, values: HashMap<String, ConfigValue>) -> Result<(), RegistryError> {
        self.state.write().await.configuration.extend(values);
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<ConfigValue> {
        self.state.read().await.configuration.get(key).cloned()
    }

    async fn configuration(&self) -> HashMap<String, ConfigValue> {
        self.state.read().await.configuration.clone()
    }
}

#[async_trait]
impl ProductOperation for ProductEntry {
    fn id(&self) -> &str {
        &self.id
    }

    async fn update(&self, info: ProductInfo) -> Result<(), RegistryError> {
        if info.id != self.id {
            return Err(RegistryError::IdMismatch {
                expected: self.id.clone(),
                actual: info.id,
            });
        }

        self.state.write().await.info = Some(info);
        Ok(())
    }

    #[instrument(skip_all, fields(product_id = %self.id))]
    async fn update_metadata(&self, json: &str) -> Result<(), RegistryError> {
        // Parsed before taking the lock, readers only ever see a complete schema
        let metadata = Arc::new(metadata::from_json(json)?);
        debug!(
            "Storing metadata '{}' with {} properties, {} functions and {} events",
            metadata.id,
            metadata.properties.len(),
            metadata.functions.len(),
            metadata.events.len()
        );

        self.state.write().await.metadata = Some(metadata);
        Ok(())
    }

    async fn info(&self) -> Option<ProductInfo> {
        self.state.read().await.info.clone()
    }

    async fn metadata(&self) -> Option<Arc<DeviceMetadata>> {
        self.state.read().await.metadata.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::MetadataError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn update_replaces_the_product_info() {
        let entry = ProductEntry::new("test".to_string());

        entry.update(ProductInfo::new("test", "first", "jet-links")).await.unwrap();
        entry.update(ProductInfo::new("test", "second", "mqtt")).await.unwrap();

        assert_eq!(entry.info().await, Some(ProductInfo::new("test", "second", "mqtt")));
    }

    #[tokio::test]
    async fn update_rejects_info_of_another_product() {
        let entry = ProductEntry::new("test".to_string());

        let result = entry.update(ProductInfo::new("other", "other", "jet-links")).await;

        assert!(matches!(result, Err(RegistryError::IdMismatch { expected, actual }) if expected == "test" && actual == "other"));
        assert_eq!(entry.info().await, None);
    }

    #[tokio::test]
    async fn update_metadata_returns_a_structurally_equal_schema() {
        let json = include_str!("../../resources/metadata/test-device.json");
        let entry = ProductEntry::new("test".to_string());

        entry.update_metadata(json).await.unwrap();

        let stored = entry.metadata().await.unwrap();
        assert_eq!(*stored, metadata::from_json(json).unwrap());
    }

    #[tokio::test]
    async fn a_malformed_schema_keeps_the_previous_metadata() {
        let entry = ProductEntry::new("test".to_string());
        entry.update_metadata(include_str!("../../resources/metadata/test-device.json")).await.unwrap();

        let result = entry
            .update_metadata(include_str!("../../tests/resources/metadata/duplicate-property.json"))
            .await;

        assert!(matches!(result, Err(RegistryError::MalformedSchema(MetadataError::DuplicateId { .. }))));
        assert_eq!(entry.metadata().await.unwrap().name.as_deref(), Some("测试设备"));
    }

    #[tokio::test]
    async fn put_overwrites_existing_keys() {
        let entry = ProductEntry::new("test".to_string());

        entry.put("eventTopic", json!(["device.events"])).await.unwrap();
        entry
            .put_all(HashMap::from([
                ("eventTopic".to_string(), json!(["device.other"])),
                ("functionReplyTopic".to_string(), json!(["device.function.reply"])),
            ]))
            .await
            .unwrap();

        assert_eq!(entry.get("eventTopic").await, Some(json!(["device.other"])));
        assert_eq!(entry.configuration().await.len(), 2);
    }
}
