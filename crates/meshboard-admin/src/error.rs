//! Error types for admin endpoint queries.

use std::time::Duration;

/// Errors that can occur while addressing or querying the admin endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The configured endpoint address could not be understood.
    #[error("invalid admin endpoint address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The endpoint could not be reached.
    #[error("failed to connect to admin endpoint {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The request could not be serialized.
    #[error("failed to encode admin request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Writing the request or reading the response failed.
    #[error("admin endpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The endpoint closed the connection without sending anything.
    #[error("admin endpoint closed the connection without responding")]
    NoResponse,

    /// The response was not valid JSON.
    #[error("failed to decode admin response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response grew beyond the accepted size.
    #[error("admin response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    /// The endpoint did not answer in time.
    #[error("admin endpoint did not respond within {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a status other than `success`.
    #[error("admin endpoint returned status {status:?}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Unsuccessful {
        status: Option<String>,
        detail: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected admin response shape: {0}")]
    Schema(#[source] serde_json::Error),
}

impl AdminError {
    /// Short message suitable for showing to a dashboard visitor.
    pub fn user_message(&self) -> &'static str {
        match self {
            AdminError::InvalidAddress { .. } => "Invalid admin socket address",
            AdminError::Connect { .. } => "Unable to connect to admin socket",
            AdminError::Encode(_) => "Unable to marshal JSON",
            AdminError::Io(_) => "Error communicating with admin socket",
            AdminError::NoResponse => "No response from admin socket",
            AdminError::Decode(_) => "Unable to unmarshal JSON",
            AdminError::ResponseTooLarge { .. } => "Response from admin socket was too large",
            AdminError::Timeout(_) => "Timed out waiting for admin socket",
            AdminError::Unsuccessful { .. } => "Non-successful response",
            AdminError::Schema(_) => "Unexpected response from admin socket",
        }
    }
}
