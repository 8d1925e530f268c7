use std::error::Error;
use std::fmt::{Display, Formatter};
use teamwork_core::db::DbError;
use teamwork_core::{ServiceError, StoreError};

/// Everything a command can fail with.
#[derive(Debug)]
pub enum CliError {
    Db(DbError),
    Store(StoreError),
    Service(ServiceError),
    Io(std::io::Error),
    Logging(String),
    /// Bad argument value or an id that does not resolve.
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Store(err) if err.is_quota_exceeded() => {
                write!(f, "storage is full; remove some documents first ({err})")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Service(err) if err.is_quota_exceeded() => {
                write!(f, "storage is full; remove some documents first ({err})")
            }
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Usage(message) => f.write_str(message),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Logging(_) | Self::Usage(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
