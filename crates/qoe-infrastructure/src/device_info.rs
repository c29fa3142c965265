use qoe_core::device::DeviceInfoProvider;
use serde_json::{Map, Value, json};

/// Device identity fixed at construction.
///
/// `device_properties` returns the configured properties with the requesting
/// task key added under `task_key`.
#[derive(Debug, Clone)]
pub struct StaticDeviceInfo {
    device_id: String,
    properties: Map<String, Value>,
}

impl StaticDeviceInfo {
    pub fn new(device_id: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            device_id: device_id.into(),
            properties,
        }
    }
}

impl DeviceInfoProvider for StaticDeviceInfo {
    fn device_id(&self) -> String {
        self.device_id.clone()
    }

    fn device_properties(&self, task_key: &str) -> Value {
        let mut properties = self.properties.clone();
        properties.insert("task_key".to_string(), json!(task_key));
        Value::Object(properties)
    }
}
