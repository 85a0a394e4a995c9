mod device_entry;
mod error;
pub mod memory;
mod operation;
mod product_entry;

pub use error::RegistryError;
pub use memory::InMemoryRegistry;
pub use operation::{ConfigOperation, DeviceOperation, DeviceRegistry, ProductOperation};
