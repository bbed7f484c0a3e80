use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VMWARE_VS_FOREMAN_LOG";
const DEFAULT_LEVEL: &str = "warn";

/// Filter directive for our crate; HTTP and SMTP internals stay at `warn`.
pub fn filter_directive(level: Option<&str>) -> String {
    let env_level = std::env::var(LOG_ENV).ok();
    let base = level
        .or(env_level.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LEVEL);
    format!("vmware_vs_foreman={base},reqwest=warn,hyper=warn,lettre=warn")
}

/// Logs go to stderr so stdout stays clean for `--json` and the table.
pub fn init(level: Option<&str>) {
    let directive = filter_directive(level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
