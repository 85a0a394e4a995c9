use crate::registry::RegistryError;

/// Outcome of one batch. A failed batch stops at the failing device, the devices after it
/// are not registered and nothing is retried.
#[derive(Debug)]
pub struct BatchReport {
    pub index: usize,
    pub size: usize,
    pub registered: usize,
    pub failure: Option<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub device_id: String,
    pub error: RegistryError,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// A batch whose task panicked. Devices registered before the panic stay registered and are
/// counted, the rest of the batch is not.
#[derive(Debug)]
pub struct LostBatch {
    pub index: usize,
    pub size: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ChildReport {
    pub parent_id: String,
    pub registered: u32,
    pub failure: Option<BatchFailure>,
}

#[derive(Debug, Default)]
pub struct ProvisioningReport {
    /// Devices registered with their credentials, the final value of the shared counter.
    pub registered: u64,
    /// Sorted by batch index, completion order is not recorded.
    pub batches: Vec<BatchReport>,
    /// Batches whose task panicked, sorted by batch index.
    pub lost_batches: Vec<LostBatch>,
    pub children: ChildReport,
}

impl ProvisioningReport {
    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchReport> {
        self.batches.iter().filter(|batch| !batch.is_complete())
    }

    pub fn is_complete(&self) -> bool {
        self.lost_batches.is_empty() && self.children.failure.is_none() && self.batches.iter().all(BatchReport::is_complete)
    }
}
