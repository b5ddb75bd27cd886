use std::fmt;

use crate::stoat::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidIdentity,
    UnknownOption,
    MissingValue,
    InvalidPayload,
    EmptyMessage,
    NetworkFailure,
    ApiRejected,
    Usage,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::ApiRejected => 1,
            ErrorKind::UnknownOption => 2,
            ErrorKind::MissingValue => 3,
            ErrorKind::InvalidIdentity => 4,
            ErrorKind::InvalidPayload => 5,
            ErrorKind::EmptyMessage => 6,
            ErrorKind::NetworkFailure => 7,
            ErrorKind::Usage => 64,
        }
    }
}

/// Failures the CLI reports to the user with a dedicated exit code.
#[derive(Debug)]
pub enum Error {
    InvalidIdentity(String),
    InvalidPayload(String),
    EmptyMessage,
    Api(ApiError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidIdentity(_) => ErrorKind::InvalidIdentity,
            Error::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Error::EmptyMessage => ErrorKind::EmptyMessage,
            Error::Api(err) if err.status.is_none() => ErrorKind::NetworkFailure,
            Error::Api(_) => ErrorKind::ApiRejected,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidIdentity(msg) | Error::InvalidPayload(msg) => f.write_str(msg),
            Error::EmptyMessage => f.write_str("need content, piped stdin, embeds, interactions or attachments"),
            Error::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}
