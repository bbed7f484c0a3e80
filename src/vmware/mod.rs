//! VMware inventory via the vSphere Automation REST API.
//!
//! A session is opened with `POST /api/session`, every VM is listed with
//! `GET /api/vcenter/vm`, and each VM's BIOS UUID is read from
//! `GET /api/vcenter/vm/{vm}`. The session is deleted when the [`Session`]
//! guard goes out of scope, whether the fetch succeeded or not.

use std::time::Duration;

use crate::config::Credentials;
use crate::core::VmRecord;
use crate::engine::VmInventory;

mod client;
mod error;
mod types;

pub use client::{Session, VsphereClient, fault_message};
pub use error::{VmwareError, VmwareResult};
pub use types::{ApiFault, VmIdentity, VmInfo, VmSummary};

/// vCenter returns at most this many VMs from the list endpoint.
pub const LIST_LIMIT: usize = 4000;

#[derive(Debug, Clone)]
pub struct VmwareOptions {
    pub base_url: String,
    pub credentials: Credentials,
    pub insecure: bool,
    pub timeout: Duration,
}

impl VmwareOptions {
    pub fn new(host: &str, port: u16, credentials: Credentials) -> Self {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        Self {
            base_url: format!("https://{host}:{port}"),
            credentials,
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Opens a session, reads every VM, and closes the session.
pub fn fetch_vms(opts: &VmwareOptions) -> VmwareResult<Vec<VmRecord>> {
    let client = VsphereClient::new(opts)?;
    let session = client.login()?;
    list_vm_records(&session)
}

pub fn list_vm_records(session: &Session<'_>) -> VmwareResult<Vec<VmRecord>> {
    let summaries: Vec<VmSummary> = session.get("/api/vcenter/vm")?;
    tracing::info!(count = summaries.len(), "listed VMware virtual machines");
    if summaries.len() >= LIST_LIMIT {
        tracing::warn!(
            limit = LIST_LIMIT,
            "vCenter returned the maximum number of VMs; the inventory may be truncated"
        );
    }

    let mut records = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let info: VmInfo = match session.get(&format!("/api/vcenter/vm/{}", summary.vm)) {
            Ok(info) => info,
            // Deleted between the list call and this one.
            Err(VmwareError::Api { status: 404, .. }) => {
                tracing::warn!(vm = %summary.vm, name = %summary.name, "VM disappeared during enumeration; skipping");
                continue;
            }
            Err(err) => return Err(err),
        };
        records.push(record_from(summary, info));
    }
    Ok(records)
}

fn record_from(summary: VmSummary, info: VmInfo) -> VmRecord {
    let uuid = info
        .identity
        .and_then(|identity| identity.bios_uuid)
        .unwrap_or_default();
    if uuid.is_empty() {
        tracing::warn!(vm = %summary.vm, "VM did not report a BIOS UUID");
    }
    let name = if info.name.is_empty() {
        summary.name
    } else {
        info.name
    };
    VmRecord::new(uuid, name, info.power_state)
}

/// [`VmInventory`] backed by a live vCenter.
#[derive(Debug, Clone)]
pub struct VsphereInventory {
    opts: VmwareOptions,
}

impl VsphereInventory {
    pub fn new(opts: VmwareOptions) -> Self {
        Self { opts }
    }
}

impl VmInventory for VsphereInventory {
    fn fetch_vms(&self) -> anyhow::Result<Vec<VmRecord>> {
        fetch_vms(&self.opts).map_err(|e| {
            anyhow::Error::new(e).context(format!("VMware inventory from {}", self.opts.base_url))
        })
    }
}
