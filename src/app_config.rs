use config::{Config, ConfigError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    product: Product,
    provisioning: Provisioning,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(name).required(true))
            .add_source(config::File::with_name(&format!("{}_local", name)).required(false))
            .add_source(config::Environment::with_prefix("GATEWAY").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn provisioning(&self) -> &Provisioning {
        &self.provisioning
    }
}

#[derive(Debug, Deserialize)]
pub struct Product {
    id: String,
    name: String,
    protocol: String,
    metadata_path: Option<String>,
    #[serde(default)]
    topics: Topics,
}

impl Product {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn metadata_path(&self) -> Option<&Path> {
        self.metadata_path.as_deref().map(Path::new)
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Topics {
    pub event: Vec<String>,
    pub device_connect: Vec<String>,
    pub device_disconnect: Vec<String>,
    pub child_device_connect: Vec<String>,
    pub child_device_disconnect: Vec<String>,
    pub function_reply: Vec<String>,
}

impl Default for Topics {
    fn default() -> Self {
        Topics {
            event: vec!["device.events".to_string()],
            device_connect: vec!["device.connect".to_string()],
            device_disconnect: vec!["device.disconnect".to_string()],
            child_device_connect: vec!["device.child.connect".to_string()],
            child_device_disconnect: vec!["device.child.disconnect".to_string()],
            function_reply: vec!["device.function.reply".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Provisioning {
    start_with: u64,
    device_number: u64,
    device_prefix: String,
    device_name: String,
    batch_size: usize,
    workers: usize,
    queue_capacity: usize,
    secure_id: String,
    secure_key: String,
    children: Children,
}

impl Provisioning {
    pub fn start_with(&self) -> u64 {
        self.start_with
    }

    pub fn device_number(&self) -> u64 {
        self.device_number
    }

    pub fn device_prefix(&self) -> &str {
        &self.device_prefix
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn secure_id(&self) -> &str {
        &self.secure_id
    }

    pub fn secure_key(&self) -> &str {
        &self.secure_key
    }

    pub fn children(&self) -> &Children {
        &self.children
    }
}

#[derive(Debug, Deserialize)]
pub struct Children {
    prefix: String,
    name: String,
    count: u32,
    parent_id: Option<String>,
}

impl Children {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                product: Product {
                    id: "test".to_string(),
                    name: "Test model".to_string(),
                    protocol: "jet-links".to_string(),
                    metadata_path: None,
                    topics: Topics::default(),
                },
                provisioning: Provisioning {
                    start_with: 0,
                    device_number: 1000,
                    device_prefix: "test".to_string(),
                    device_name: "test".to_string(),
                    batch_size: 1000,
                    workers: 4,
                    queue_capacity: 4,
                    secure_id: "test".to_string(),
                    secure_key: "test".to_string(),
                    children: Children {
                        prefix: "child".to_string(),
                        name: "test-child".to_string(),
                        count: 20,
                        parent_id: None,
                    },
                },
            },
        }
    }

    pub fn devices(mut self, start_with: u64, device_number: u64) -> Self {
        self.config.provisioning.start_with = start_with;
        self.config.provisioning.device_number = device_number;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.provisioning.batch_size = batch_size;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.provisioning.workers = workers;
        self
    }

    pub fn children(mut self, count: u32, parent_id: Option<&str>) -> Self {
        self.config.provisioning.children.count = count;
        self.config.provisioning.children.parent_id = parent_id.map(str::to_string);
        self
    }

    pub fn metadata_path(mut self, path: &str) -> Self {
        self.config.product.metadata_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
