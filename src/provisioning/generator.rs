use crate::domain::DeviceInfo;
use std::iter::FusedIterator;

/// Attributes shared by every generated device.
#[derive(Clone, Debug)]
pub struct DeviceTemplate {
    pub id_prefix: String,
    pub protocol: String,
    pub name: String,
    pub product_id: String,
}

/// Finite, single-pass sequence of devices with ids `prefix + i` for `i` in `[start, end)`.
#[derive(Clone, Debug)]
pub struct DeviceGenerator {
    template: DeviceTemplate,
    next: u64,
    end: u64,
}

impl DeviceGenerator {
    /// `end` is clamped to `start`, use [`ProvisioningPlan`](super::ProvisioningPlan) to reject overflowing ranges.
    pub fn new(template: DeviceTemplate, start: u64, end: u64) -> Self {
        DeviceGenerator {
            template,
            next: start,
            end: end.max(start),
        }
    }

    pub fn device_id(prefix: &str, index: u64) -> String {
        format!("{}{}", prefix, index)
    }
}

impl Iterator for DeviceGenerator {
    type Item = DeviceInfo;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        let index = self.next;
        self.next += 1;
        Some(DeviceInfo::new(
            Self::device_id(&self.template.id_prefix, index),
            self.template.protocol.as_str(),
            self.template.name.as_str(),
            self.template.product_id.as_str(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DeviceGenerator {}

impl FusedIterator for DeviceGenerator {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> DeviceTemplate {
        DeviceTemplate {
            id_prefix: "test".to_string(),
            protocol: "jet-links".to_string(),
            name: "test".to_string(),
            product_id: "test".to_string(),
        }
    }

    #[test]
    fn generates_sequential_ids_from_the_start() {
        let ids = DeviceGenerator::new(template(), 5, 8).map(|device| device.id).collect::<Vec<_>>();

        assert_eq!(ids, vec!["test5", "test6", "test7"]);
    }

    #[test]
    fn generated_devices_reference_the_product_without_parent() {
        let device = DeviceGenerator::new(template(), 0, 1).next().unwrap();

        assert_eq!(device, DeviceInfo::new("test0", "jet-links", "test", "test"));
        assert_eq!(device.parent_device_id, None);
    }

    #[test]
    fn an_empty_range_generates_nothing() {
        let mut generator = DeviceGenerator::new(template(), 10, 10);

        assert_eq!(generator.len(), 0);
        assert_eq!(generator.next(), None);
    }

    #[test]
    fn len_tracks_the_remaining_devices() {
        let mut generator = DeviceGenerator::new(template(), 0, 2500);
        generator.next();

        assert_eq!(generator.len(), 2499);
    }
}
