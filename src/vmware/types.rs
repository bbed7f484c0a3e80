//! Wire types for the subset of the vSphere Automation API we read.

use serde::Deserialize;

use crate::core::PowerState;

/// Entry of `GET /api/vcenter/vm`.
#[derive(Debug, Clone, Deserialize)]
pub struct VmSummary {
    /// Managed-object id, e.g. `vm-42`.
    pub vm: String,
    #[serde(default)]
    pub name: String,
}

/// `GET /api/vcenter/vm/{vm}`; only the fields we need.
#[derive(Debug, Clone, Deserialize)]
pub struct VmInfo {
    #[serde(default)]
    pub name: String,
    pub power_state: PowerState,
    #[serde(default)]
    pub identity: Option<VmIdentity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmIdentity {
    #[serde(default)]
    pub bios_uuid: Option<String>,
}

/// Error body returned by vCenter for non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFault {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub messages: Vec<LocalizableMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizableMessage {
    #[serde(default)]
    pub default_message: String,
}

impl ApiFault {
    pub fn message(&self) -> Option<String> {
        let joined = self
            .messages
            .iter()
            .map(|m| m.default_message.trim())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join("; ");
        if !joined.is_empty() {
            return Some(joined);
        }
        self.error_type.clone()
    }
}
