//! Blocking vSphere REST client with a scoped API session.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::vmware::error::{VmwareError, VmwareResult};
use crate::vmware::types::ApiFault;
use crate::vmware::VmwareOptions;

const SESSION_HEADER: &str = "vmware-api-session-id";
const MAX_BODY_EXCERPT: usize = 500;

pub struct VsphereClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl VsphereClient {
    /// Builds the HTTP client; no request is sent until [`login`](Self::login).
    pub fn new(opts: &VmwareOptions) -> VmwareResult<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(opts.insecure)
            .timeout(opts.timeout)
            .connect_timeout(opts.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| VmwareError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: opts.base_url.trim_end_matches('/').to_string(),
            username: opts.credentials.username.clone(),
            password: opts.credentials.password.clone(),
        })
    }

    /// `POST /api/session`. The returned guard deletes the session when dropped.
    pub fn login(&self) -> VmwareResult<Session<'_>> {
        let url = format!("{}/api/session", self.base_url);
        tracing::debug!(%url, user = %self.username, "creating vSphere session");

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()?;
        let resp = check_status(resp)?;

        let text = resp.text()?;
        let id: String = serde_json::from_str(text.trim())
            .map_err(|e| VmwareError::Parse(format!("session id: {e}")))?;
        if id.is_empty() {
            return Err(VmwareError::Parse("empty session id".to_string()));
        }

        Ok(Session { client: self, id })
    }
}

/// An authenticated vSphere API session.
pub struct Session<'a> {
    client: &'a VsphereClient,
    id: String,
}

impl Session<'_> {
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> VmwareResult<T> {
        let url = format!("{}{}", self.client.base_url, path);
        let resp = self
            .client
            .http
            .get(&url)
            .header(SESSION_HEADER, self.id.as_str())
            .send()?;
        let resp = check_status(resp)?;
        let text = resp.text()?;
        serde_json::from_str(&text).map_err(|e| {
            VmwareError::Parse(format!("GET {path}: {e}; body: {}", excerpt(&text)))
        })
    }

    fn logout(&self) -> VmwareResult<()> {
        let url = format!("{}/api/session", self.client.base_url);
        let resp = self
            .client
            .http
            .delete(&url)
            .header(SESSION_HEADER, self.id.as_str())
            .send()?;
        check_status(resp)?;
        Ok(())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        match self.logout() {
            Ok(()) => tracing::debug!("vSphere session closed"),
            Err(err) => tracing::warn!(error = %err, "failed to close vSphere session"),
        }
    }
}

fn check_status(resp: Response) -> VmwareResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    let message = fault_message(&body);
    match status {
        StatusCode::UNAUTHORIZED => Err(VmwareError::Authentication(message)),
        _ => Err(VmwareError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Prefers the server-provided fault text over the raw body.
pub fn fault_message(body: &str) -> String {
    if let Ok(fault) = serde_json::from_str::<ApiFault>(body) {
        if let Some(msg) = fault.message() {
            return msg;
        }
    }
    let body = body.trim();
    if body.is_empty() {
        return "(empty response body)".to_string();
    }
    excerpt(body)
}

fn excerpt(s: &str) -> String {
    if s.chars().count() <= MAX_BODY_EXCERPT {
        return s.to_string();
    }
    let head: String = s.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{head}...")
}
