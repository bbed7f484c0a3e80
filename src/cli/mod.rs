use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::config::{Credentials, EffectiveConfig};
use crate::engine::{Engine, EngineOptions, MailPlan};
use crate::foreman::{ForemanApi, ForemanOptions};
use crate::notify::SmtpNotifier;
use crate::ui::UiConfig;
use crate::vmware::{VmwareOptions, VsphereInventory};

#[derive(Debug, Parser)]
#[command(
    name = "vmware-vs-foreman",
    version,
    about = "Report VMware VMs that are missing from Foreman, matched by BIOS UUID"
)]
pub struct Cli {
    /// vCenter / ESXi host to connect to
    #[arg(short = 's', long)]
    pub host: String,
    /// Port to connect on [default: 443]
    #[arg(short = 'o', long)]
    pub port: Option<u16>,
    /// Foreman API query URL (embed filters and per_page yourself)
    #[arg(short = 'a', long)]
    pub foreman_api_url: String,
    /// Print the full list of missing VMs to the console
    #[arg(short = 'v', long)]
    pub verbose: bool,
    /// Whitespace-separated addresses to mail the CSV to
    #[arg(short = 'e', long)]
    pub email_recipients: Option<String>,
    /// Remove the CSV once done (after mailing, if any)
    #[arg(short = 'r', long)]
    pub remove_csv: bool,
    /// CSV output path [default: /tmp/vmware_vs_foreman.csv]
    #[arg(short = 'f', long)]
    pub output_csv: Option<PathBuf>,
    /// Print the audit as JSON on stdout
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub quiet: bool,
    /// Accept invalid TLS certificates from vCenter and Foreman
    #[arg(long)]
    pub insecure: bool,
    /// Network timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,
}

/// Everything a run needs, resolved once from flags, env and config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub vmware: VmwareOptions,
    pub foreman: ForemanOptions,
    pub engine: EngineOptions,
    pub smtp: SmtpNotifier,
    pub ui: UiConfig,
}

impl Settings {
    pub fn resolve(cli: &Cli, credentials: Credentials, cfg: EffectiveConfig) -> Result<Self> {
        let host = cli.host.trim();
        if host.is_empty() {
            return Err(crate::exit::invalid_args("--host must not be empty"));
        }
        let timeout = Duration::from_secs(cli.timeout.unwrap_or(cfg.network.timeout_secs).max(1));

        let mut vmware = VmwareOptions::new(host, cli.port.unwrap_or(cfg.vmware.port), credentials);
        vmware.insecure = cli.insecure || cfg.vmware.insecure;
        vmware.timeout = timeout;

        let foreman_url = cli.foreman_api_url.trim();
        crate::foreman::validate_url(foreman_url)
            .map_err(|e| crate::exit::invalid_args_err(anyhow::Error::new(e)))?;
        let mut foreman = ForemanOptions::new(foreman_url);
        foreman.insecure = cli.insecure || cfg.foreman.insecure;
        foreman.timeout = timeout;

        let mail = match cli.email_recipients.as_deref() {
            None => None,
            Some(raw) => {
                let to = crate::notify::parse_recipients(raw);
                if to.is_empty() {
                    return Err(crate::exit::invalid_args(
                        "--email-recipients was given but contains no addresses",
                    ));
                }
                Some(MailPlan {
                    from: cfg.mail.from.clone().unwrap_or_else(crate::config::default_mail_from),
                    to,
                    subject: cfg.mail.subject.clone(),
                    body: cfg.mail.body.clone(),
                })
            }
        };

        let stderr_is_tty = io::stderr().is_terminal();
        let ui = UiConfig {
            quiet: cli.quiet,
            verbose: cli.verbose,
            json: cli.json,
        };

        Ok(Self {
            vmware,
            foreman,
            engine: EngineOptions {
                output_csv: cli
                    .output_csv
                    .clone()
                    .unwrap_or_else(|| cfg.report.output_csv.clone()),
                remove_csv: cli.remove_csv,
                mail,
                show_progress: stderr_is_tty && !cli.quiet && !cli.json,
            },
            smtp: SmtpNotifier {
                relay: cfg.mail.relay.clone(),
                port: cfg.mail.port,
                timeout,
            },
            ui,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.log_level.as_deref());

    // Checked before anything that could touch the network.
    let credentials = Credentials::from_env()?;

    let env_config_path = std::env::var_os("VMWARE_VS_FOREMAN_CONFIG").map(PathBuf::from);
    let home_dir = crate::config::home_dir();
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        home_dir.as_deref(),
    )
    .map_err(crate::exit::invalid_args_err)?;

    let settings = Settings::resolve(&cli, credentials, cfg)?;
    execute(settings)
}

pub fn execute(settings: Settings) -> Result<()> {
    let Settings {
        vmware,
        foreman,
        engine,
        smtp,
        ui,
    } = settings;

    let engine = Engine::new(engine);
    let audit = engine.audit(&VsphereInventory::new(vmware), &ForemanApi::new(foreman))?;

    if ui.json {
        crate::report::write_json(&audit)?;
    } else if ui.verbose {
        crate::report::print_table(&audit.missing);
    }

    let published = engine.publish(&audit, &smtp)?;
    crate::ui::print_summary(&audit, &published, &ui);
    Ok(())
}
