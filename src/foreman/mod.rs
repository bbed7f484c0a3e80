//! Foreman host inventory: one GET against a caller-built query URL.
//!
//! No pagination is done here. The URL must already request a page large
//! enough to hold every host (e.g. `?per_page=10000`).

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::core::ForemanInventory;
use crate::engine::HostInventory;

#[derive(Debug, Error)]
pub enum ForemanError {
    #[error("invalid Foreman URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to Foreman failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Foreman returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected Foreman response: {0}")]
    Decode(String),
}

pub type ForemanResult<T> = Result<T, ForemanError>;

#[derive(Debug, Clone, Deserialize)]
struct HostEntry {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ForemanOptions {
    pub url: String,
    pub insecure: bool,
    pub timeout: Duration,
}

impl ForemanOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

pub fn fetch_hosts(opts: &ForemanOptions) -> ForemanResult<ForemanInventory> {
    let (url, auth) = split_userinfo(&opts.url)?;

    let client = Client::builder()
        .danger_accept_invalid_certs(opts.insecure)
        .timeout(opts.timeout)
        .build()?;

    tracing::debug!(url = %url, "querying Foreman");
    let mut req = client.get(url.clone()).header(ACCEPT, "application/json");
    if let Some((user, pass)) = auth {
        req = req.basic_auth(user, pass);
    }
    let resp = req.send()?;

    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(ForemanError::Status {
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }

    let inventory = parse_hosts(&body)?;
    tracing::info!(count = inventory.len(), "loaded Foreman hosts");
    Ok(inventory)
}

/// Parses a Foreman host listing into a UUID → hostname map.
///
/// `results` is either keyed by host (`{"<key>": {...}}`) or the API v2
/// array form.
pub fn parse_hosts(body: &str) -> ForemanResult<ForemanInventory> {
    let mut value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ForemanError::Decode(format!("malformed JSON: {e}")))?;
    let Some(results) = value.get_mut("results").map(serde_json::Value::take) else {
        return Err(ForemanError::Decode(
            "response has no `results` field".to_string(),
        ));
    };

    let entries: Vec<(Option<String>, HostEntry)> = match results {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, raw)| -> ForemanResult<(Option<String>, HostEntry)> {
                let entry = host_entry(raw, &format!("host {key:?}"))?;
                Ok((Some(key), entry))
            })
            .collect::<ForemanResult<_>>()?,
        serde_json::Value::Array(list) => list
            .into_iter()
            .enumerate()
            .map(|(i, raw)| -> ForemanResult<(Option<String>, HostEntry)> {
                Ok((None, host_entry(raw, &format!("results[{i}]"))?))
            })
            .collect::<ForemanResult<_>>()?,
        other => {
            return Err(ForemanError::Decode(format!(
                "`results` must be an object or array of hosts, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut inventory = ForemanInventory::new();
    for (key, entry) in entries {
        let Some(uuid) = entry.uuid.filter(|u| !u.trim().is_empty()) else {
            tracing::debug!(host = ?entry.name.as_deref().or(key.as_deref()), "skipping host without uuid");
            continue;
        };
        let hostname = entry.name.or(key).unwrap_or_default();
        inventory.insert(uuid.trim(), hostname);
    }
    Ok(inventory)
}

fn host_entry(raw: serde_json::Value, what: &str) -> ForemanResult<HostEntry> {
    serde_json::from_value(raw).map_err(|e| ForemanError::Decode(format!("{what}: {e}")))
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

type BasicAuth = (String, Option<String>);

/// Checks that `raw` is an http(s) URL without sending anything.
pub fn validate_url(raw: &str) -> ForemanResult<()> {
    split_userinfo(raw).map(|_| ())
}

/// Moves `user:pass@` out of the URL so it can be sent as basic auth.
fn split_userinfo(raw: &str) -> ForemanResult<(Url, Option<BasicAuth>)> {
    let invalid = |reason: String| ForemanError::InvalidUrl {
        url: redact_userinfo(raw),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.username().is_empty() {
        return Ok((url, None));
    }
    let user = decode(url.username());
    let pass = url.password().map(decode);
    url.set_username("")
        .and_then(|()| url.set_password(None))
        .map_err(|()| invalid("cannot strip credentials".to_string()))?;
    Ok((url, Some((user, pass))))
}

/// Replaces any `user:pass@` in a possibly unparseable URL with `***@`.
fn redact_userinfo(raw: &str) -> String {
    let Some(scheme_end) = raw.find("://") else {
        return raw.to_string();
    };
    let rest = &raw[scheme_end + 3..];
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***{}", &raw[..scheme_end], &rest[at..]),
        None => raw.to_string(),
    }
}

fn decode(s: &str) -> String {
    let escaped = s.replace('+', "%2B");
    url::form_urlencoded::parse(format!("x={escaped}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| s.to_string())
}

fn excerpt(s: &str) -> String {
    let s = s.trim();
    if s.chars().count() <= 300 {
        return s.to_string();
    }
    let head: String = s.chars().take(300).collect();
    format!("{head}...")
}

/// [`HostInventory`] backed by a live Foreman.
#[derive(Debug, Clone)]
pub struct ForemanApi {
    opts: ForemanOptions,
}

impl ForemanApi {
    pub fn new(opts: ForemanOptions) -> Self {
        Self { opts }
    }
}

impl HostInventory for ForemanApi {
    fn fetch_hosts(&self) -> anyhow::Result<ForemanInventory> {
        fetch_hosts(&self.opts).map_err(|e| anyhow::Error::new(e).context("Foreman inventory"))
    }
}
