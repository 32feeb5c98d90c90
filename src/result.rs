use compact_str::{format_compact, CompactString};
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, GistrError>;

#[derive(Debug, Clone, Error)]
pub enum GistrError {
    #[error("Not signed in to GitHub: {0}")]
    NotAuthorized(CompactString),
    #[error("Failure reading configuration file: {0}")]
    ConfigError(CompactString),
    #[error("Still busy with the previous request.")]
    Busy,
    #[error("{0}")]
    GeneralError(CompactString),
}

// ClientError wraps reqwest::Error and is not Clone; events carry this instead.
impl From<&ClientError> for GistrError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Network(e) => GistrError::GeneralError(format_compact!("Network error: {e}")),
            ClientError::ApiProvider { reason } => {
                GistrError::GeneralError(format_compact!("GitHub says: {reason}"))
            },
            ClientError::AuthCouldNot { reason } => GistrError::NotAuthorized(reason.clone()),
            ClientError::Serialization { reason } => {
                GistrError::GeneralError(format_compact!("Unexpected response: {reason}"))
            },
            ClientError::Busy => GistrError::Busy,
            ClientError::InvalidUrl { url } => {
                GistrError::GeneralError(format_compact!("Invalid URL: {url}"))
            },
            ClientError::Config(msg) => GistrError::ConfigError(msg.as_str().into()),
            ClientError::ConfigValidation { field, message } => {
                GistrError::ConfigError(format_compact!("{field}: {message}"))
            },
        }
    }
}

impl From<ClientError> for GistrError {
    fn from(err: ClientError) -> Self {
        GistrError::from(&err)
    }
}
