use crate::domain::{ConfigValue, DeviceInfo};
use crate::registry::{ConfigOperation, DeviceOperation, RegistryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct DeviceEntry {
    id: String,
    state: RwLock<DeviceState>,
}

#[derive(Debug)]
struct DeviceState {
    info: DeviceInfo,
    configuration: HashMap<String, ConfigValue>,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeviceEntry {
    pub fn new(info: DeviceInfo) -> Self {
        let now = Utc::now();
        DeviceEntry {
            id: info.id.clone(),
            state: RwLock::new(DeviceState {
                info,
                configuration: HashMap::new(),
                registered_at: now,
                updated_at: now,
            }),
        }
    }

    /// Swaps in the new info and returns the previous one. Configuration is left untouched.
    pub async fn replace_info(&self, info: DeviceInfo) -> DeviceInfo {
        let mut state = self.state.write().await;
        state.updated_at = Utc::now();
        std::mem::replace(&mut state.info, info)
    }
}

#[async_trait]
impl ConfigOperation for DeviceEntry {
    async fn put(&self, key: &str, value: ConfigValue) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        state.configuration.insert(key.to_string(), value);
        state.updated_at = Utc::now();
        Ok(())
    }

    async fn put_all(&self, values: HashMap<String, ConfigValue>) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;
        state.configuration.extend(values);
        state.updated_at = Utc::now();
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
impl DeviceOperation for DeviceEntry {
    fn id(&self) -> &str {
        &self.id
    }

    async fn info(&self) -> DeviceInfo {
        self.state.read().await.info.clone()
    }

    async fn registered_at(&self) -> DateTime<Utc> {
        self.state.read().await.registered_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.state.read().await.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replace_info_keeps_the_configuration() {
        let entry = DeviceEntry::new(DeviceInfo::new("test0", "jet-links", "first", "test"));
        entry.put("secureId", json!("test")).await.unwrap();

        let previous = entry.replace_info(DeviceInfo::new("test0", "jet-links", "second", "test")).await;

        assert_eq!(previous.name, "first");
        assert_eq!(entry.info().await.name, "second");
        assert_eq!(entry.get("secureId").await, Some(json!("test")));
    }

    #[tokio::test]
    async fn writes_move_updated_at_but_not_registered_at() {
        let entry = DeviceEntry::new(DeviceInfo::new("test0", "jet-links", "test", "test"));
        let registered_at = entry.registered_at().await;

        entry.put_all(HashMap::from([("secureKey".to_string(), json!("test"))])).await.unwrap();

        assert_eq!(entry.registered_at().await, registered_at);
        assert!(entry.updated_at().await >= registered_at);
    }
}
