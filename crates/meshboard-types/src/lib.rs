//! Shared peer and link types for the meshboard dashboard.
//!
//! The admin endpoint of a mesh node reports one record per active switch
//! port ([`RawLinkRecord`]). The dashboard shows one entry per remote peer
//! address instead, so this crate provides the aggregation step that
//! collapses link records into [`PeerSummary`] values, along with the small
//! display helpers the renderer needs.
//!
//! Nothing here performs I/O. Every value lives for one request cycle.

mod peers;
mod units;

pub use peers::{aggregate, PeerMap, PeerSummary};
pub use units::format_bytes;

use serde::{Deserialize, Serialize};

/// Serialized coordinate path reported for the root of the spanning tree.
pub const ROOT_COORDS: &str = "[]";

/// One active link as reported by the admin endpoint.
///
/// Records are keyed by their link identifier (switch port) in the enclosing
/// map, so the identifier is not repeated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLinkRecord {
    /// Mesh address of the peer on the far side of the link.
    #[serde(rename = "ip")]
    pub peer_address: String,
    /// Bytes sent over this link.
    pub bytes_sent: u64,
    /// Bytes received over this link.
    #[serde(rename = "bytes_recvd")]
    pub bytes_received: u64,
    /// Serialized coordinate path of the peer, e.g. `[1 4 2]`.
    pub coords: String,
}

impl RawLinkRecord {
    /// Bytes moved in both directions.
    ///
    /// Widened so two saturated counters still add up exactly.
    pub fn total_bytes(&self) -> u128 {
        u128::from(self.bytes_sent) + u128::from(self.bytes_received)
    }
}

/// Returns the display form of a serialized coordinate path.
///
/// The empty path belongs to the root node and is shown as `Root`.
pub fn coords_display(coords: &str) -> &str {
    if coords == ROOT_COORDS {
        "Root"
    } else {
        coords
    }
}
