use crate::core::PowerState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    /// BIOS UUID as reported by vCenter; case varies by source.
    pub uuid: String,
    pub name: String,
    pub power_state: PowerState,
}

impl VmRecord {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, power_state: PowerState) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            power_state,
        }
    }

    pub fn normalized_uuid(&self) -> String {
        self.uuid.to_lowercase()
    }
}
