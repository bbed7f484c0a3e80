use crate::core::VmRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub generated_at: String,
    pub vmware_total: usize,
    pub foreman_total: usize,
    pub missing: Vec<VmRecord>,
}
