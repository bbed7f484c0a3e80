use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    CredentialMissing,
    InvalidArgs,
    ConnectionFault,
    FetchFailure,
    WriteFailure,
    NotifyFailure,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::CredentialMissing => 1,
            ExitCode::InvalidArgs => 2,
            ExitCode::ConnectionFault => 10,
            ExitCode::FetchFailure => 11,
            ExitCode::WriteFailure => 12,
            ExitCode::NotifyFailure => 13,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::InvalidArgs.as_i32()
}

pub fn code_of(err: &anyhow::Error) -> Option<ExitCode> {
    err.downcast_ref::<ExitError>().map(|e| e.code)
}

fn tagged(code: ExitCode, err: anyhow::Error) -> anyhow::Error {
    ExitError::new(code, err).into()
}

pub fn credential_missing(message: impl Into<String>) -> anyhow::Error {
    tagged(ExitCode::CredentialMissing, anyhow::anyhow!(message.into()))
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    tagged(ExitCode::InvalidArgs, anyhow::anyhow!(message.into()))
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    tagged(ExitCode::InvalidArgs, err)
}

pub fn connection_fault(err: anyhow::Error) -> anyhow::Error {
    tagged(ExitCode::ConnectionFault, err)
}

pub fn fetch_failure(err: anyhow::Error) -> anyhow::Error {
    tagged(ExitCode::FetchFailure, err)
}

pub fn write_failure(err: anyhow::Error) -> anyhow::Error {
    tagged(ExitCode::WriteFailure, err)
}

pub fn notify_failure(err: anyhow::Error) -> anyhow::Error {
    tagged(ExitCode::NotifyFailure, err)
}
