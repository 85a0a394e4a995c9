mod config_key;
mod device;
pub mod metadata;
mod product;

pub use config_key::DeviceConfigKey;
pub use device::DeviceInfo;
pub use product::ProductInfo;

/// Opaque configuration value, stored as-is by the registry.
pub type ConfigValue = serde_json::Value;
