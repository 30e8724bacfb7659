//! Failures talking to the employee service.

use shared::{domain::EmployeeId, error::ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid employee service url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("employee service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("employee {0} was not found")]
    NotFound(EmployeeId),
    #[error("employee service returned {status}: {message}")]
    Status {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("cannot update an employee that has no id")]
    MissingId,
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// One line suitable for showing next to the form that triggered it.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidBaseUrl { url, .. } => {
                format!("The employee service address '{url}' is not a valid URL.")
            }
            Self::Transport(err) if err.is_timeout() => {
                "The employee service did not answer in time; please retry.".to_string()
            }
            Self::Transport(err) if err.is_connect() => {
                "The employee service is unreachable; check the address and network.".to_string()
            }
            Self::Transport(_) => "The request to the employee service failed.".to_string(),
            Self::NotFound(id) => format!("Employee {id} no longer exists."),
            Self::Status { code, message, .. } => match code {
                ErrorCode::Validation | ErrorCode::Conflict => {
                    format!("The employee service rejected the record: {message}")
                }
                ErrorCode::Unauthorized | ErrorCode::Forbidden => {
                    "You are not allowed to perform this action.".to_string()
                }
                _ => format!("The employee service reported an error: {message}"),
            },
            Self::MissingId => "This employee has not been saved yet.".to_string(),
            Self::Decode(_) => "The employee service sent an unreadable response.".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || matches!(
                self,
                Self::Status {
                    code: ErrorCode::NotFound,
                    ..
                }
            )
    }
}
