//! Error types surfaced by client operations
//!
//! Every failure a command can hit maps to one [`ClientError`] kind, and each
//! kind maps to a process exit code through [`ClientError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

use crate::version::error::RegistryError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The spec string does not match `NAME (OP VERSION)?`
    #[error("bad format for version specification: '{spec}': {reason}")]
    BadSpecFormat { spec: String, reason: String },

    /// A local path, a package or a matching release does not exist
    #[error("{0}")]
    ResourceNotFound(String),

    #[error("bad sha1 sum for '{file}': expected {expected}, got {actual}")]
    BadChecksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("command failed with exit code {code:?}: {command}")]
    BuildFailed { command: String, code: Option<i32> },

    #[error("{0}")]
    Unsupported(String),

    #[error("failed to read configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Registry(RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ClientError::BadSpecFormat { .. } | ClientError::Unsupported(_) => 2,
            ClientError::ResourceNotFound(_) => 3,
            ClientError::BadChecksum { .. } => 4,
            ClientError::BuildFailed { .. } => 5,
            ClientError::Config { .. } => 6,
            ClientError::Registry(_) | ClientError::Io(_) => 1,
        }
    }
}

impl From<RegistryError> for ClientError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(what) => {
                ClientError::ResourceNotFound(format!("not found: {}", what))
            }
            other => ClientError::Registry(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
