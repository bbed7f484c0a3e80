use crate::core::{ForemanInventory, VmRecord};

/// VMs whose lower-cased BIOS UUID is not a Foreman key, in input order.
pub fn reconcile(vms: &[VmRecord], hosts: &ForemanInventory) -> Vec<VmRecord> {
    vms.iter()
        .filter(|vm| !hosts.contains(&vm.normalized_uuid()))
        .cloned()
        .collect()
}
