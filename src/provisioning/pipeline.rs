use crate::domain::{ConfigValue, DeviceInfo};
use crate::extensions::iterator_ext::Batching;
use crate::provisioning::generator::DeviceGenerator;
use crate::provisioning::report::{BatchFailure, BatchReport, ChildReport, LostBatch, ProvisioningReport};
use crate::provisioning::ProvisioningPlan;
use crate::registry::{DeviceRegistry, RegistryError};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{self, JoinError, JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

type BatchOutcome = Result<BatchReport, LostBatch>;

#[derive(Debug)]
struct Batch {
    index: usize,
    devices: Vec<DeviceInfo>,
}

/// Starts provisioning in the background and returns immediately.
///
/// Every batch runs in its own task and at most `workers` batches run at the same time, so
/// they complete in no particular order. The child devices are registered while the batches
/// are dispatched and do not wait for their parent to be registered.
pub fn spawn(registry: Arc<dyn DeviceRegistry>, plan: ProvisioningPlan) -> ProvisioningHandle {
    let counter = Arc::new(AtomicU64::new(0));
    let task = task::spawn(run(registry, plan, counter.clone()));

    ProvisioningHandle { task, counter }
}

#[derive(Debug)]
pub struct ProvisioningHandle {
    task: JoinHandle<ProvisioningReport>,
    counter: Arc<AtomicU64>,
}

impl ProvisioningHandle {
    /// Number of devices registered so far, across all batches.
    pub fn registered(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the run together with its running batches. Devices registered so far stay registered.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub async fn wait(self) -> Result<ProvisioningReport, ProvisioningError> {
        Ok(self.task.await?)
    }
}

#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("invalid provisioning plan: {0}")]
    InvalidPlan(String),
    #[error("provisioning did not complete: {0}")]
    Aborted(#[from] JoinError),
}

#[instrument(skip_all, fields(devices = plan.device_number()))]
async fn run(registry: Arc<dyn DeviceRegistry>, plan: ProvisioningPlan, counter: Arc<AtomicU64>) -> ProvisioningReport {
    info!(
        "🏭 Provisioning {} device(s) in batches of {} with {} worker(s)...",
        plan.device_number(),
        plan.batch_size(),
        plan.workers()
    );
    let start = Instant::now();

    let (batch_tx, batch_rx) = mpsc::channel::<Batch>(plan.queue_capacity());
    let credentials = Arc::new(plan.credentials().to_configuration());

    let (dispatched, outcomes, children) = tokio::join!(
        produce(plan.devices(), plan.batch_size(), batch_tx),
        dispatch(batch_rx, plan.workers(), registry.clone(), credentials, counter.clone()),
        register_children(registry.as_ref(), &plan)
    );

    let mut batches = Vec::with_capacity(dispatched);
    let mut lost_batches = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(report) => batches.push(report),
            Err(lost) => lost_batches.push(lost),
        }
    }
    batches.sort_by_key(|batch| batch.index);
    lost_batches.sort_by_key(|lost| lost.index);

    let report = ProvisioningReport {
        registered: counter.load(Ordering::Acquire),
        batches,
        lost_batches,
        children,
    };
    let failed = report.failed_batches().count();
    let duration = Instant::now() - start;
    if report.is_complete() {
        info!(duration = ?duration, "🏭 Provisioning {} device(s)... OK", report.registered);
    } else {
        warn!(
            duration = ?duration,
            "🏭 Provisioning {} device(s)... incomplete, {} registered, {} failed batch(es), {} lost batch(es)",
            plan.device_number(),
            report.registered,
            failed,
            report.lost_batches.len()
        );
    }

    report
}

async fn produce(devices: DeviceGenerator, batch_size: usize, tx: Sender<Batch>) -> usize {
    let mut dispatched = 0;
    for (index, devices) in devices.batches(batch_size).enumerate() {
        if tx.send(Batch { index, devices }).await.is_err() {
            warn!("⚠️ Dispatching batch {}... failed, the dispatcher is gone", index);
            break;
        }
        dispatched += 1;
    }

    debug!("Dispatched {} batch(es)", dispatched);
    dispatched
}

/// Spawns one task per queued batch, waiting for a free worker permit before each spawn.
async fn dispatch(
    mut queue: Receiver<Batch>,
    workers: usize,
    registry: Arc<dyn DeviceRegistry>,
    credentials: Arc<HashMap<String, ConfigValue>>,
    counter: Arc<AtomicU64>,
) -> Vec<BatchOutcome> {
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    while let Some(batch) = queue.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        tasks.spawn(work(batch, permit, registry.clone(), credentials.clone(), counter.clone()));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => error!("🏭 Batch task did not complete: {}", err),
        }
    }
    outcomes
}

/// Registers one batch while holding a worker permit. A panic only loses this batch.
async fn work(
    batch: Batch,
    _permit: OwnedSemaphorePermit,
    registry: Arc<dyn DeviceRegistry>,
    credentials: Arc<HashMap<String, ConfigValue>>,
    counter: Arc<AtomicU64>,
) -> BatchOutcome {
    let index = batch.index;
    let size = batch.devices.len();

    AssertUnwindSafe(register_batch(registry.as_ref(), batch, &credentials, &counter))
        .catch_unwind()
        .await
        .map_err(|panic| {
            let reason = panic_message(panic.as_ref());
            error!("🏭 Registering batch {}... lost: {}", index, reason);
            LostBatch { index, size, reason }
        })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[instrument(skip_all, fields(batch = batch.index, size = batch.devices.len()))]
async fn register_batch(
    registry: &dyn DeviceRegistry,
    batch: Batch,
    credentials: &HashMap<String, ConfigValue>,
    counter: &AtomicU64,
) -> BatchReport {
    let size = batch.devices.len();
    let mut registered = 0;

    for device in batch.devices {
        let device_id = device.id.clone();
        if let Err(err) = register_device(registry, device, credentials).await {
            warn!(
                device_id,
                "⚠️ Registering batch {}... failed at '{}' after {} of {} device(s): {}", batch.index, device_id, registered, size, err
            );
            return BatchReport {
                index: batch.index,
                size,
                registered,
                failure: Some(BatchFailure { device_id, error: err }),
            };
        }

        registered += 1;
        counter.fetch_add(1, Ordering::AcqRel);
    }

    info!("🔵 Registering batch {}... OK, {} device(s) registered so far", batch.index, counter.load(Ordering::Acquire));
    BatchReport {
        index: batch.index,
        size,
        registered,
        failure: None,
    }
}

async fn register_device(registry: &dyn DeviceRegistry, device: DeviceInfo, credentials: &HashMap<String, ConfigValue>) -> Result<(), RegistryError> {
    let operation = registry.register(device).await?;
    operation.put_all(credentials.clone()).await
}

// Not synchronized with the batches, the parent may be registered before, during or after this loop
#[instrument(skip_all, fields(parent_id = %plan.children().parent_id))]
async fn register_children(registry: &dyn DeviceRegistry, plan: &ProvisioningPlan) -> ChildReport {
    let mut report = ChildReport {
        parent_id: plan.children().parent_id.clone(),
        ..ChildReport::default()
    };

    for child in plan.child_devices() {
        let device_id = child.id.clone();
        if let Err(err) = registry.register(child).await {
            warn!(device_id, "⚠️ Registering child device '{}'... failed: {}", device_id, err);
            report.failure = Some(BatchFailure { device_id, error: err });
            break;
        }
        report.registered += 1;
    }

    info!("🔵 Registered {} child device(s) of '{}'", report.registered, report.parent_id);
    report
}
