use crate::domain::DeviceInfo;
use crate::registry::device_entry::DeviceEntry;
use crate::registry::product_entry::ProductEntry;
use crate::registry::{DeviceOperation, DeviceRegistry, ProductOperation, RegistryError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Registry keeping every product and device in memory.
///
/// The maps are only locked to look up or insert an entry, each entry guards its own state.
/// Writes to different ids therefore never wait on each other's record.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    products: RwLock<HashMap<String, Arc<ProductEntry>>>,
    devices: RwLock<HashMap<String, Arc<DeviceEntry>>>,
    children: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for the device and whether it was created by this call.
    async fn device_entry(&self, device: &DeviceInfo) -> (Arc<DeviceEntry>, bool) {
        if let Some(entry) = self.devices.read().await.get(&device.id) {
            return (entry.clone(), false);
        }

        let mut devices = self.devices.write().await;
        if let Some(entry) = devices.get(&device.id) {
            return (entry.clone(), false);
        }

        let entry = Arc::new(DeviceEntry::new(device.clone()));
        devices.insert(device.id.clone(), entry.clone());
        (entry, true)
    }

    async fn relink(&self, device_id: &str, previous_parent: Option<&str>, parent: Option<&str>) {
        if previous_parent == parent {
            return;
        }

        let mut children = self.children.write().await;
        if let Some(previous_parent) = previous_parent {
            if let Some(siblings) = children.get_mut(previous_parent) {
                siblings.remove(device_id);
                if siblings.is_empty() {
                    children.remove(previous_parent);
                }
            }
        }
        if let Some(parent) = parent {
            children.entry(parent.to_string()).or_default().insert(device_id.to_string());
        }
    }
}

fn validate(device: &DeviceInfo) -> Result<(), RegistryError> {
    let field = if device.id.is_empty() {
        "id"
    } else if device.protocol.is_empty() {
        "protocol"
    } else if device.product_id.is_empty() {
        "product id"
    } else {
        return Ok(());
    };

    Err(RegistryError::InvalidDevice {
        id: device.id.clone(),
        field,
    })
}

#[async_trait]
impl DeviceRegistry for InMemoryRegistry {
    async fn product(&self, product_id: &str) -> Result<Arc<dyn ProductOperation>, RegistryError> {
        if product_id.is_empty() {
            return Err(RegistryError::InvalidId);
        }

        if let Some(entry) = self.products.read().await.get(product_id) {
            return Ok(entry.clone());
        }

        let mut products = self.products.write().await;
        let entry = products
            .entry(product_id.to_string())
            .or_insert_with(|| {
                debug!(product_id, "Creating product '{}'", product_id);
                Arc::new(ProductEntry::new(product_id.to_string()))
            })
            .clone();
        Ok(entry)
    }

    #[instrument(skip_all, fields(device_id = %device.id))]
    async fn register(&self, device: DeviceInfo) -> Result<Arc<dyn DeviceOperation>, RegistryError> {
        validate(&device)?;

        let parent = device.parent().map(str::to_string);
        let (entry, created) = self.device_entry(&device).await;
        let previous_parent = if created {
            None
        } else {
            entry.replace_info(device).await.parent().map(str::to_string)
        };

        self.relink(entry.id(), previous_parent.as_deref(), parent.as_deref()).await;
        Ok(entry)
    }

    async fn device(&self, device_id: &str) -> Option<Arc<dyn DeviceOperation>> {
        self.devices
            .read()
            .await
            .get(device_id)
            .map(|entry| entry.clone() as Arc<dyn DeviceOperation>)
    }

    async fn children(&self, parent_id: &str) -> Vec<String> {
        self.children
            .read()
            .await
            .get(parent_id)
            .map(|children| children.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductInfo;
    use futures::future::join_all;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use test_log::test;

    fn device(id: &str, name: &str) -> DeviceInfo {
        DeviceInfo::new(id, "jet-links", name, "test")
    }

    #[test(tokio::test)]
    async fn product_returns_the_same_handle_for_the_same_id() {
        let registry = InMemoryRegistry::new();

        let first = registry.product("test").await.unwrap();
        first.update(ProductInfo::new("test", "Test model", "jet-links")).await.unwrap();
        let second = registry.product("test").await.unwrap();

        assert_eq!(second.info().await, Some(ProductInfo::new("test", "Test model", "jet-links")));
    }

    #[test(tokio::test)]
    async fn product_rejects_an_empty_id() {
        let registry = InMemoryRegistry::new();

        let result = registry.product("").await;

        assert!(matches!(result, Err(RegistryError::InvalidId)));
    }

    #[test(tokio::test)]
    async fn register_rejects_incomplete_devices() {
        let registry = InMemoryRegistry::new();

        let result = registry.register(DeviceInfo::new("test0", "", "test", "test")).await;

        assert!(matches!(result, Err(RegistryError::InvalidDevice { field: "protocol", .. })));
        assert_eq!(registry.device_count().await, 0);
    }

    #[test(tokio::test)]
    async fn register_upserts_and_keeps_untouched_configuration() {
        let registry = InMemoryRegistry::new();

        let operation = registry.register(device("test0", "first")).await.unwrap();
        operation
            .put_all(HashMap::from([
                ("secureId".to_string(), json!("id")),
                ("secureKey".to_string(), json!("key")),
            ]))
            .await
            .unwrap();

        let operation = registry.register(device("test0", "second")).await.unwrap();
        operation.put("secureKey", json!("rotated")).await.unwrap();

        let stored = registry.device("test0").await.unwrap();
        assert_eq!(registry.device_count().await, 1);
        assert_eq!(stored.info().await.name, "second");
        assert_eq!(stored.get("secureId").await, Some(json!("id")));
        assert_eq!(stored.get("secureKey").await, Some(json!("rotated")));
    }

    #[test(tokio::test)]
    async fn children_can_be_registered_before_their_parent() {
        let registry = InMemoryRegistry::new();

        registry.register(device("child1", "test-child").with_parent("test0")).await.unwrap();
        registry.register(device("child0", "test-child").with_parent("test0")).await.unwrap();

        assert!(registry.device("test0").await.is_none());
        assert_eq!(registry.children("test0").await, vec!["child0", "child1"]);
    }

    #[test(tokio::test)]
    async fn re_registering_a_child_moves_it_to_the_new_parent() {
        let registry = InMemoryRegistry::new();
        registry.register(device("child0", "test-child").with_parent("test0")).await.unwrap();

        registry.register(device("child0", "test-child").with_parent("test1")).await.unwrap();

        assert!(registry.children("test0").await.is_empty());
        assert_eq!(registry.children("test1").await, vec!["child0"]);
    }

    #[test(tokio::test)]
    async fn re_registering_without_a_parent_unlinks_the_child() {
        let registry = InMemoryRegistry::new();
        registry.register(device("child0", "test-child").with_parent("test0")).await.unwrap();

        registry.register(device("child0", "test-child")).await.unwrap();

        assert!(registry.children("test0").await.is_empty());
    }

    #[test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
    async fn concurrent_registrations_of_different_ids_all_land() {
        let registry = Arc::new(InMemoryRegistry::new());

        let tasks = (0..64).map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                for j in 0..16 {
                    let operation = registry.register(device(&format!("test{}-{}", i, j), "test")).await.unwrap();
                    operation.put("secureId", json!("test")).await.unwrap();
                }
            })
        });
        for result in join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(registry.device_count().await, 64 * 16);
    }
}
