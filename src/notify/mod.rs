//! Mails the CSV through an SMTP relay (plain connection, no auth, no retry).

use std::path::{Path, PathBuf};
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::engine::Notifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no recipients given")]
    NoRecipients,
    #[error("invalid email address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content type: {0}")]
    ContentType(String),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP send via {relay} failed: {source}")]
    Send {
        relay: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

/// Splits a whitespace-separated recipient list.
pub fn parse_recipients(s: &str) -> Vec<String> {
    s.split_whitespace().map(ToOwned::to_owned).collect()
}

pub fn build_message(mail: &Mail) -> Result<Message, NotifyError> {
    if mail.to.is_empty() {
        return Err(NotifyError::NoRecipients);
    }

    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.as_str());
    for to in &mail.to {
        builder = builder.to(mailbox(to)?);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(mail.body.clone()));
    for path in &mail.attachments {
        parts = parts.singlepart(attachment(path)?);
    }

    Ok(builder.multipart(parts)?)
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn attachment(path: &Path) -> Result<SinglePart, NotifyError> {
    let bytes = std::fs::read(path).map_err(|source| NotifyError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| NotifyError::ContentType(e.to_string()))?;
    Ok(Attachment::new(filename).body(bytes, content_type))
}

#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    pub relay: String,
    pub port: u16,
    pub timeout: Duration,
}

impl SmtpNotifier {
    pub fn send_mail(&self, mail: &Mail) -> Result<(), NotifyError> {
        let message = build_message(mail)?;
        let transport = SmtpTransport::builder_dangerous(self.relay.as_str())
            .port(self.port)
            .timeout(Some(self.timeout))
            .build();

        tracing::info!(relay = %self.relay, port = self.port, recipients = mail.to.len(), "sending report mail");
        transport.send(&message).map_err(|source| NotifyError::Send {
            relay: format!("{}:{}", self.relay, self.port),
            source,
        })?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        Ok(self.send_mail(mail)?)
    }
}
