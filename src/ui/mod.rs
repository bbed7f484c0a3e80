use anyhow::Error;
use std::io::{self, Write};

use crate::core::Audit;
use crate::engine::Published;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub quiet: bool,
    pub verbose: bool,
    pub json: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    write_error(&mut stderr, err);
}

pub fn write_error(out: &mut dyn Write, err: &Error) {
    let _ = writeln!(out, "error: {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(out, "caused by:");
        for cause in causes {
            let _ = writeln!(out, "  - {cause}");
        }
    }

    let _ = writeln!(
        out,
        "hint: re-run with `--log-level debug` for request-level detail"
    );
}

/// One-line run summary on stderr.
pub fn print_summary(audit: &Audit, published: &Published, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "{}", format_summary(audit, published));
}

pub fn format_summary(audit: &Audit, published: &Published) -> String {
    let mut s = format!(
        "{} of {} VMware VMs missing from Foreman ({} Foreman hosts)",
        audit.missing.len(),
        audit.vmware_total,
        audit.foreman_total
    );
    if published.csv_removed {
        s.push_str("; CSV removed");
    } else {
        s.push_str(&format!("; CSV: {}", published.csv_path.display()));
    }
    if !published.emailed_to.is_empty() {
        s.push_str(&format!("; emailed to {}", published.emailed_to.join(", ")));
    }
    s
}
