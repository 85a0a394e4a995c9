use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: String,
    pub protocol: String,
    pub name: String,
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_device_id: Option<String>,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, protocol: impl Into<String>, name: impl Into<String>, product_id: impl Into<String>) -> Self {
        DeviceInfo {
            id: id.into(),
            protocol: protocol.into(),
            name: name.into(),
            product_id: product_id.into(),
            parent_device_id: None,
        }
    }

    pub fn with_parent(mut self, parent_device_id: impl Into<String>) -> Self {
        self.parent_device_id = Some(parent_device_id.into());
        self
    }

    /// Returns the parent id, treating an empty id as no parent.
    pub fn parent(&self) -> Option<&str> {
        self.parent_device_id.as_deref().filter(|parent| !parent.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_ignores_an_empty_parent_id() {
        let device = DeviceInfo::new("test0", "jet-links", "test", "test").with_parent("");

        assert_eq!(device.parent(), None);
    }

    #[test]
    fn parent_returns_the_parent_id() {
        let device = DeviceInfo::new("child0", "jet-links", "test-child", "test").with_parent("test0");

        assert_eq!(device.parent(), Some("test0"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let device = DeviceInfo::new("child0", "jet-links", "test-child", "test").with_parent("test0");

        let json = serde_json::to_value(&device).unwrap();

        assert_eq!(json["productId"], "test");
        assert_eq!(json["parentDeviceId"], "test0");
    }
}
