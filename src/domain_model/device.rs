use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-supplied session partition key. Clients that never send one all
/// share the `"default"` slot.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

pub const DEFAULT_DEVICE_ID: &str = "default";

impl DeviceId {
    pub fn resolve(raw: Option<String>) -> Self {
        match raw {
            Some(s) if !s.trim().is_empty() => DeviceId(s),
            _ => DeviceId(DEFAULT_DEVICE_ID.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::resolve(Some(s.to_string()))
    }
}
