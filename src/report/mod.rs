use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use unicode_width::UnicodeWidthStr;

use crate::core::{Audit, VmRecord};

pub const CSV_HEADER: [&str; 2] = ["name", "powerstate"];

/// Writes `name,powerstate` rows. The UUID is deliberately not persisted.
pub fn write_csv(path: &Path, records: &[VmRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
    write_csv_to(file, records)
        .with_context(|| format!("failed to write CSV file: {}", path.display()))
}

pub fn write_csv_to<W: Write>(writer: W, records: &[VmRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for rec in records {
        wtr.write_record([rec.name.as_str(), rec.power_state.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Full table, no row cap and no column truncation.
pub fn render_table(out: &mut dyn Write, records: &[VmRecord]) {
    let label_uuid = "uuid";
    let label_name = "name";
    let label_power = "powerstate";

    let uuid_w = records
        .iter()
        .map(|r| r.uuid.width())
        .max()
        .unwrap_or(0)
        .max(label_uuid.width());
    let name_w = records
        .iter()
        .map(|r| r.name.width())
        .max()
        .unwrap_or(0)
        .max(label_name.width());

    let _ = writeln!(
        out,
        "{}  {}  {}",
        pad_end(label_uuid, uuid_w),
        pad_end(label_name, name_w),
        label_power
    );
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(uuid_w),
        "-".repeat(name_w),
        "-".repeat(label_power.len())
    );
    for rec in records {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            pad_end(&rec.uuid, uuid_w),
            pad_end(&rec.name, name_w),
            rec.power_state
        );
    }
}

pub fn print_table(records: &[VmRecord]) {
    let mut out = io::stdout().lock();
    render_table(&mut out, records);
}

/// Prints the audit as JSON on stdout. A closed pipe is not an error.
pub fn write_json(audit: &Audit) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_json_to(&mut stdout, audit)
}

pub fn write_json_to(out: &mut dyn Write, audit: &Audit) -> Result<()> {
    let mut buf = serde_json::to_vec_pretty(audit)?;
    buf.push(b'\n');

    match out.write_all(&buf).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(crate::exit::write_failure(
            anyhow::Error::new(err).context("failed to write JSON to stdout"),
        )),
    }
}

fn pad_end(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}
