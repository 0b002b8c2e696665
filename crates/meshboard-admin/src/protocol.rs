//! Request and response schema of the admin protocol.
//!
//! Each exchange is one JSON request object answered by one JSON response
//! envelope:
//!
//! ```json
//! {"status": "success", "response": {"switchpeers": {"1": {"ip": "...", ...}}}}
//! ```

use std::collections::BTreeMap;

use meshboard_types::RawLinkRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AdminError;

/// Status value of a successful response envelope.
pub const STATUS_SUCCESS: &str = "success";

/// A request sent to the admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRequest {
    pub request: String,
}

impl AdminRequest {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
        }
    }

    /// Lists every active switch port and its peer.
    pub fn get_switch_peers() -> Self {
        Self::new("getSwitchPeers")
    }
}

/// Body of a successful `getSwitchPeers` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwitchPeers {
    /// Link records keyed by link identifier.
    pub switchpeers: BTreeMap<String, RawLinkRecord>,
}

/// Checks the envelope status and returns the `response` body.
///
/// An absent or non-string `status` counts as unsuccessful, the same as an
/// explicit failure status.
pub fn unwrap_envelope(mut envelope: Value) -> Result<Value, AdminError> {
    let status = envelope.get("status").and_then(Value::as_str);
    if status != Some(STATUS_SUCCESS) {
        let detail = envelope
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(AdminError::Unsuccessful {
            status: status.map(str::to_string),
            detail,
        });
    }

    match envelope.get_mut("response") {
        Some(body) => Ok(body.take()),
        None => Err(AdminError::Schema(serde::de::Error::missing_field(
            "response",
        ))),
    }
}

/// Decodes a response body into the typed structure `T`.
pub fn decode_body<T>(body: Value) -> Result<T, AdminError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(body).map_err(AdminError::Schema)
}
