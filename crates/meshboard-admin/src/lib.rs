//! Client for the administrative control socket of a mesh node.
//!
//! The admin endpoint speaks JSON over a stream socket: the client writes one
//! request object and reads back one response envelope per connection.
//!
//! # Usage
//!
//! ```rust,ignore
//! use meshboard_admin::{AdminClient, AdminEndpoint, DEFAULT_TIMEOUT};
//!
//! let endpoint: AdminEndpoint = "unix:///var/run/yggdrasil.sock".parse()?;
//! let client = AdminClient::new(endpoint, DEFAULT_TIMEOUT);
//! let peers = client.get_switch_peers().await?;
//! ```

mod client;
mod endpoint;
mod error;
pub mod protocol;

pub use client::{AdminClient, DEFAULT_TIMEOUT, MAX_RESPONSE_BYTES};
pub use endpoint::AdminEndpoint;
pub use error::AdminError;
pub use protocol::{AdminRequest, SwitchPeers};
