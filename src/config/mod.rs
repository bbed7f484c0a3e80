use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_OUTPUT_CSV: &str = "/tmp/vmware_vs_foreman.csv";
pub const DEFAULT_SUBJECT: &str = "VMware vs Foreman CSV";
pub const DEFAULT_BODY: &str = "Here is the current VMware vs Foreman CSV";

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub vmware: VmwareConfig,
    pub foreman: ForemanConfig,
    pub network: NetworkConfig,
    pub report: ReportConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct VmwareConfig {
    pub port: u16,
    pub insecure: bool,
}

#[derive(Debug, Clone)]
pub struct ForemanConfig {
    pub insecure: bool,
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_csv: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay: String,
    pub port: u16,
    /// `None` means `vmware_vs_foreman@<local hostname>`.
    pub from: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            vmware: VmwareConfig {
                port: 443,
                insecure: false,
            },
            foreman: ForemanConfig { insecure: false },
            network: NetworkConfig { timeout_secs: 30 },
            report: ReportConfig {
                output_csv: PathBuf::from(DEFAULT_OUTPUT_CSV),
            },
            mail: MailConfig {
                relay: "127.0.0.1".to_string(),
                port: 25,
                from: None,
                subject: DEFAULT_SUBJECT.to_string(),
                body: DEFAULT_BODY.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    vmware: Option<RawVmwareConfig>,
    foreman: Option<RawForemanConfig>,
    network: Option<RawNetworkConfig>,
    report: Option<RawReportConfig>,
    mail: Option<RawMailConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVmwareConfig {
    port: Option<u16>,
    insecure: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForemanConfig {
    insecure: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetworkConfig {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportConfig {
    output_csv: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMailConfig {
    relay: Option<String>,
    port: Option<u16>,
    from: Option<String>,
    subject: Option<String>,
    body: Option<String>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/vmware-vs-foreman/config.toml")
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

pub fn load(config_path: Option<&Path>, home_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| home_dir.map(default_config_path));

    if let Some(path) = path.filter(|p| p.exists()) {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw);
        tracing::debug!(path = %path.display(), "loaded config file");
    } else if let Some(explicit) = config_path {
        anyhow::bail!("config file not found: {}", explicit.display());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(vmware) = raw.vmware {
        if let Some(port) = vmware.port {
            cfg.vmware.port = port;
        }
        if let Some(insecure) = vmware.insecure {
            cfg.vmware.insecure = insecure;
        }
    }

    if let Some(foreman) = raw.foreman {
        if let Some(insecure) = foreman.insecure {
            cfg.foreman.insecure = insecure;
        }
    }

    if let Some(network) = raw.network {
        if let Some(timeout_secs) = network.timeout_secs {
            cfg.network.timeout_secs = timeout_secs;
        }
    }

    if let Some(report) = raw.report {
        if let Some(output_csv) = report.output_csv {
            cfg.report.output_csv = output_csv;
        }
    }

    if let Some(mail) = raw.mail {
        if let Some(relay) = mail.relay {
            cfg.mail.relay = relay;
        }
        if let Some(port) = mail.port {
            cfg.mail.port = port;
        }
        if mail.from.is_some() {
            cfg.mail.from = mail.from;
        }
        if let Some(subject) = mail.subject {
            cfg.mail.subject = subject;
        }
        if let Some(body) = mail.body {
            cfg.mail.body = body;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_PORT") {
        cfg.vmware.port = v
            .trim()
            .parse::<u16>()
            .with_context(|| "VMWARE_VS_FOREMAN_PORT")?;
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_INSECURE") {
        let insecure = parse_bool(&v).with_context(|| "VMWARE_VS_FOREMAN_INSECURE")?;
        cfg.vmware.insecure = insecure;
        cfg.foreman.insecure = insecure;
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_TIMEOUT") {
        cfg.network.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "VMWARE_VS_FOREMAN_TIMEOUT")?;
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_OUTPUT_CSV") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.report.output_csv = PathBuf::from(v);
        }
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_SMTP_RELAY") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.mail.relay = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_SMTP_PORT") {
        cfg.mail.port = v
            .trim()
            .parse::<u16>()
            .with_context(|| "VMWARE_VS_FOREMAN_SMTP_PORT")?;
    }
    if let Ok(v) = std::env::var("VMWARE_VS_FOREMAN_MAIL_FROM") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.mail.from = Some(v.to_string());
        }
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}

/// vCenter credentials, read from `VMWARE_USER` / `VMWARE_PASS`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("VMWARE_USER").ok();
        let password = std::env::var("VMWARE_PASS").ok();
        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(crate::exit::credential_missing(
                "VMWARE_USER or VMWARE_PASS environment variable not set",
            )),
        }
    }
}

/// `vmware_vs_foreman@<fqdn>`; many relays refuse unqualified sender domains.
pub fn default_mail_from() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    format!("vmware_vs_foreman@{}", fqdn(&host))
}

/// Qualifies a short hostname through a forward then reverse lookup.
/// Falls back to `host` when no dotted name turns up.
pub fn fqdn(host: &str) -> String {
    if host.contains('.') {
        return host.to_string();
    }
    let addrs = match dns_lookup::lookup_host(host) {
        Ok(addrs) => addrs,
        Err(err) => {
            tracing::debug!(host, error = %err, "hostname lookup failed");
            return host.to_string();
        }
    };
    addrs
        .into_iter()
        .filter_map(|addr| dns_lookup::lookup_addr(&addr).ok())
        .find(|name| name.contains('.') && !name.ends_with(".in-addr.arpa"))
        .unwrap_or_else(|| host.to_string())
}
