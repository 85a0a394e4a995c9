mod device_metadata;
mod factory;
mod serialized_metadata;

pub use device_metadata::{DeviceMetadata, EventMetadata, FunctionMetadata, PropertyMetadata, ValueType};
pub use factory::{MetadataError, from_json};
