use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{Audit, ForemanInventory, VmRecord};
use crate::notify::Mail;

pub trait VmInventory {
    fn fetch_vms(&self) -> Result<Vec<VmRecord>>;
}

pub trait HostInventory {
    fn fetch_hosts(&self) -> Result<ForemanInventory>;
}

pub trait Notifier {
    fn send(&self, mail: &Mail) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct MailPlan {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub output_csv: PathBuf,
    pub remove_csv: bool,
    /// `None` skips the notifier entirely.
    pub mail: Option<MailPlan>,
    pub show_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub csv_path: PathBuf,
    pub emailed_to: Vec<String>,
    pub csv_removed: bool,
}

pub struct Engine {
    opts: EngineOptions,
}

impl Engine {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// Fetches VMware, then Foreman, and reconciles them.
    pub fn audit(&self, vms: &dyn VmInventory, hosts: &dyn HostInventory) -> Result<Audit> {
        let pb = self.spinner("Fetching VMware inventory...");
        let vm_records = vms.fetch_vms().map_err(crate::exit::connection_fault);
        let vm_records = match vm_records {
            Ok(v) => v,
            Err(err) => {
                finish(pb);
                return Err(err);
            }
        };
        if let Some(pb) = &pb {
            pb.set_message("Querying Foreman...");
        }
        let foreman = hosts.fetch_hosts().map_err(crate::exit::fetch_failure);
        finish(pb);
        let foreman = foreman?;

        let missing = crate::reconcile::reconcile(&vm_records, &foreman);
        tracing::info!(
            vmware = vm_records.len(),
            foreman = foreman.len(),
            missing = missing.len(),
            "reconciled inventories"
        );

        Ok(Audit {
            generated_at: now_rfc3339(),
            vmware_total: vm_records.len(),
            foreman_total: foreman.len(),
            missing,
        })
    }

    /// Writes the CSV, mails it if recipients are configured, then removes
    /// it if asked. A mail failure leaves the CSV in place.
    pub fn publish(&self, audit: &Audit, notifier: &dyn Notifier) -> Result<Published> {
        let path = &self.opts.output_csv;
        crate::report::write_csv(path, &audit.missing).map_err(crate::exit::write_failure)?;
        tracing::info!(path = %path.display(), rows = audit.missing.len(), "wrote CSV");

        let mut emailed_to = Vec::new();
        if let Some(plan) = &self.opts.mail {
            let mail = Mail {
                from: plan.from.clone(),
                to: plan.to.clone(),
                subject: plan.subject.clone(),
                body: plan.body.clone(),
                attachments: vec![path.clone()],
            };
            notifier
                .send(&mail)
                .with_context(|| format!("failed to email {}", path.display()))
                .map_err(crate::exit::notify_failure)?;
            emailed_to = plan.to.clone();
        }

        let mut csv_removed = false;
        if self.opts.remove_csv {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove CSV file: {}", path.display()))
                .map_err(crate::exit::write_failure)?;
            csv_removed = true;
        }

        Ok(Published {
            csv_path: path.clone(),
            emailed_to,
            csv_removed,
        })
    }

    fn spinner(&self, message: &'static str) -> Option<indicatif::ProgressBar> {
        use std::io::IsTerminal;
        if !(self.opts.show_progress && std::io::stderr().is_terminal()) {
            return None;
        }
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

fn finish(pb: Option<indicatif::ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
