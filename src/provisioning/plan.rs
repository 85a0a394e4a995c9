use crate::app_config::AppConfig;
use crate::domain::{ConfigValue, DeviceConfigKey, DeviceInfo};
use crate::provisioning::generator::{DeviceGenerator, DeviceTemplate};
use crate::provisioning::ProvisioningError;
use std::collections::HashMap;

/// Everything one provisioning run needs, validated up front.
#[derive(Clone, Debug)]
pub struct ProvisioningPlan {
    template: DeviceTemplate,
    start_with: u64,
    end: u64,
    batch_size: usize,
    workers: usize,
    queue_capacity: usize,
    credentials: Credentials,
    children: ChildPlan,
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub secure_id: String,
    pub secure_key: String,
}

impl Credentials {
    pub fn to_configuration(&self) -> HashMap<String, ConfigValue> {
        HashMap::from([
            (DeviceConfigKey::SecureId.key().to_string(), ConfigValue::from(self.secure_id.as_str())),
            (DeviceConfigKey::SecureKey.key().to_string(), ConfigValue::from(self.secure_key.as_str())),
        ])
    }
}

#[derive(Clone, Debug)]
pub struct ChildPlan {
    pub id_prefix: String,
    pub name: String,
    pub count: u32,
    pub parent_id: String,
}

impl ProvisioningPlan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        template: DeviceTemplate,
        start_with: u64,
        device_number: u64,
        batch_size: usize,
        workers: usize,
        queue_capacity: usize,
        credentials: Credentials,
        children: ChildPlan,
    ) -> Result<Self, ProvisioningError> {
        let end = start_with.checked_add(device_number).ok_or_else(|| {
            ProvisioningError::InvalidPlan(format!("start_with {} + device_number {} overflows", start_with, device_number))
        })?;
        if batch_size == 0 {
            return Err(ProvisioningError::InvalidPlan("batch_size must be positive".to_string()));
        }
        if workers == 0 {
            return Err(ProvisioningError::InvalidPlan("workers must be positive".to_string()));
        }
        if queue_capacity == 0 {
            return Err(ProvisioningError::InvalidPlan("queue_capacity must be positive".to_string()));
        }
        if template.product_id.is_empty() {
            return Err(ProvisioningError::InvalidPlan("product id must not be empty".to_string()));
        }

        Ok(ProvisioningPlan {
            template,
            start_with,
            end,
            batch_size,
            workers,
            queue_capacity,
            credentials,
            children,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProvisioningError> {
        let product = config.product();
        let provisioning = config.provisioning();
        let children = provisioning.children();

        let template = DeviceTemplate {
            id_prefix: provisioning.device_prefix().to_string(),
            protocol: product.protocol().to_string(),
            name: provisioning.device_name().to_string(),
            product_id: product.id().to_string(),
        };
        // The first device of the first batch unless configured otherwise
        let parent_id = children
            .parent_id()
            .map(str::to_string)
            .unwrap_or_else(|| DeviceGenerator::device_id(&template.id_prefix, provisioning.start_with()));

        Self::new(
            template,
            provisioning.start_with(),
            provisioning.device_number(),
            provisioning.batch_size(),
            provisioning.workers(),
            provisioning.queue_capacity(),
            Credentials {
                secure_id: provisioning.secure_id().to_string(),
                secure_key: provisioning.secure_key().to_string(),
            },
            ChildPlan {
                id_prefix: children.prefix().to_string(),
                name: children.name().to_string(),
                count: children.count(),
                parent_id,
            },
        )
    }

    pub fn devices(&self) -> DeviceGenerator {
        DeviceGenerator::new(self.template.clone(), self.start_with, self.end)
    }

    pub fn child_devices(&self) -> impl Iterator<Item = DeviceInfo> + '_ {
        (0..self.children.count).map(|index| {
            DeviceInfo::new(
                format!("{}{}", self.children.id_prefix, index),
                self.template.protocol.as_str(),
                self.children.name.as_str(),
                self.template.product_id.as_str(),
            )
            .with_parent(self.children.parent_id.as_str())
        })
    }

    pub fn device_number(&self) -> u64 {
        self.end - self.start_with
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

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn children(&self) -> &ChildPlan {
        &self.children
    }
}
