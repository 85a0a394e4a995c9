mod generator;
mod pipeline;
mod plan;
mod product_setup;
mod report;

pub use pipeline::{ProvisioningError, spawn};
pub use plan::ProvisioningPlan;
pub use product_setup::{ProductSetup, setup_product};
