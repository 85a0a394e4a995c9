use std::fmt;

/// Well-known configuration keys written to product and device stores.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum DeviceConfigKey {
    EventTopic,
    DeviceConnectTopic,
    DeviceDisconnectTopic,
    ChildDeviceConnectTopic,
    ChildDeviceDisconnectTopic,
    FunctionReplyTopic,
    SecureId,
    SecureKey,
}

impl DeviceConfigKey {
    pub fn key(&self) -> &'static str {
        match self {
            DeviceConfigKey::EventTopic => "eventTopic",
            DeviceConfigKey::DeviceConnectTopic => "deviceConnectTopic",
            DeviceConfigKey::DeviceDisconnectTopic => "deviceDisconnectTopic",
            DeviceConfigKey::ChildDeviceConnectTopic => "childDeviceConnectTopic",
            DeviceConfigKey::ChildDeviceDisconnectTopic => "childDeviceDisconnectTopic",
            DeviceConfigKey::FunctionReplyTopic => "functionReplyTopic",
            DeviceConfigKey::SecureId => "secureId",
            DeviceConfigKey::SecureKey => "secureKey",
        }
    }
}

impl fmt::Display for DeviceConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
