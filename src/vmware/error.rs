use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmwareError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("vSphere API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to parse vSphere response: {0}")]
    Parse(String),
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for VmwareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for VmwareError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type VmwareResult<T> = Result<T, VmwareError>;
