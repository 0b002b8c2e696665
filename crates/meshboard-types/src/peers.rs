//! Per-peer aggregation of link records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{coords_display, RawLinkRecord};

/// Traffic and links for one remote peer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSummary {
    /// Mesh address of the peer.
    pub address: String,
    /// Identifiers of every link to this peer, sorted.
    pub link_ids: Vec<String>,
    /// Bytes sent across all links to this peer.
    pub bytes_sent: u128,
    /// Bytes received across all links to this peer.
    pub bytes_received: u128,
    /// Coordinate path of the first link seen for this peer.
    pub coords: String,
}

impl PeerSummary {
    fn seed(link_id: &str, record: &RawLinkRecord) -> Self {
        Self {
            address: record.peer_address.clone(),
            link_ids: vec![link_id.to_string()],
            bytes_sent: record.bytes_sent.into(),
            bytes_received: record.bytes_received.into(),
            coords: record.coords.clone(),
        }
    }

    fn absorb(&mut self, link_id: &str, record: &RawLinkRecord) {
        if record.coords != self.coords {
            tracing::debug!(
                peer = %self.address,
                link = link_id,
                kept = %self.coords,
                ignored = %record.coords,
                "links to the same peer report different coordinates"
            );
        }
        self.bytes_sent += u128::from(record.bytes_sent);
        self.bytes_received += u128::from(record.bytes_received);
        self.link_ids.push(link_id.to_string());
    }

    /// Bytes moved in both directions.
    pub fn total_bytes(&self) -> u128 {
        self.bytes_sent + self.bytes_received
    }

    /// Coordinate path for display, `Root` for the empty path.
    pub fn coords_display(&self) -> &str {
        coords_display(&self.coords)
    }

    /// Human-readable description of the links, e.g. `switch ports 1, 2`.
    pub fn describe_links(&self) -> String {
        match self.link_ids.as_slice() {
            [single] => format!("switch port {single}"),
            many => format!("switch ports {}", many.join(", ")),
        }
    }
}

/// Result of aggregating a set of link records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerMap {
    /// Summaries keyed by peer address.
    pub peers: BTreeMap<String, PeerSummary>,
    /// Bytes sent plus received over every link, regardless of peer.
    pub total_bytes: u128,
}

impl PeerMap {
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Iterates summaries in address order.
    pub fn iter(&self) -> impl Iterator<Item = &PeerSummary> {
        self.peers.values()
    }
}

/// Groups link records by peer address, summing counters per peer.
///
/// The grand total counts every record exactly once, so it always equals
/// the sum of the per-peer totals. When several links to one address report
/// different coordinates, the first one seen is kept.
pub fn aggregate<'a, I>(links: I) -> PeerMap
where
    I: IntoIterator<Item = (&'a String, &'a RawLinkRecord)>,
{
    let mut map = PeerMap::default();

    for (link_id, record) in links {
        match map.peers.get_mut(&record.peer_address) {
            Some(summary) => summary.absorb(link_id, record),
            None => {
                map.peers.insert(
                    record.peer_address.clone(),
                    PeerSummary::seed(link_id, record),
                );
            }
        }
        map.total_bytes += record.total_bytes();
    }

    for summary in map.peers.values_mut() {
        summary.link_ids.sort_by(|a, b| link_order(a, b));
    }

    map
}

/// Numeric link identifiers sort numerically, anything else after them.
fn link_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn link(addr: &str, sent: u64, recvd: u64, coords: &str) -> RawLinkRecord {
        RawLinkRecord {
            peer_address: addr.to_string(),
            bytes_sent: sent,
            bytes_received: recvd,
            coords: coords.to_string(),
        }
    }

    fn links(entries: &[(&str, RawLinkRecord)]) -> BTreeMap<String, RawLinkRecord> {
        entries
            .iter()
            .map(|(id, rec)| (id.to_string(), rec.clone()))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let raw = BTreeMap::new();
        let map = aggregate(&raw);
        assert!(map.is_empty());
        assert_eq!(map.total_bytes, 0);
    }

    #[test]
    fn links_to_same_address_are_merged() {
        let raw = links(&[
            ("1", link("200::a", 10, 20, "[1]")),
            ("2", link("200::a", 5, 7, "[1]")),
        ]);
        let map = aggregate(&raw);

        assert_eq!(map.len(), 1);
        let peer = &map.peers["200::a"];
        assert_eq!(peer.link_ids, vec!["1", "2"]);
        assert_eq!(peer.bytes_sent, 15);
        assert_eq!(peer.bytes_received, 27);
        assert_eq!(map.total_bytes, 42);
    }

    #[test]
    fn distinct_addresses_stay_separate() {
        let raw = links(&[
            ("1", link("200::a", 1, 2, "[1]")),
            ("2", link("200::b", 3, 4, "[2]")),
        ]);
        let map = aggregate(&raw);
        assert_eq!(map.len(), 2);
        assert_eq!(map.peers["200::a"].link_ids, vec!["1"]);
        assert_eq!(map.peers["200::b"].link_ids, vec!["2"]);
    }

    #[test]
    fn totals_are_conserved() {
        let raw = links(&[
            ("1", link("200::a", 100, 200, "[]")),
            ("2", link("200::b", 3, 4, "[2]")),
            ("3", link("200::a", 50, 0, "[]")),
            ("4", link("200::c", 0, 9, "[3 1]")),
            ("5", link("200::b", 11, 13, "[2]")),
        ]);
        let raw_total: u128 = raw.values().map(RawLinkRecord::total_bytes).sum();
        let map = aggregate(&raw);
        let peer_total: u128 = map.iter().map(PeerSummary::total_bytes).sum();

        assert_eq!(map.total_bytes, raw_total);
        assert_eq!(peer_total, raw_total);
    }

    #[test]
    fn saturated_counters_are_summed_exactly() {
        let raw = links(&[
            ("1", link("200::a", u64::MAX, 1, "[]")),
            ("2", link("200::a", u64::MAX, u64::MAX, "[]")),
            ("3", link("200::b", 7, 0, "[1]")),
        ]);
        let max = u128::from(u64::MAX);
        let map = aggregate(&raw);

        let peer = &map.peers["200::a"];
        assert_eq!(peer.bytes_sent, 2 * max);
        assert_eq!(peer.bytes_received, max + 1);
        assert_eq!(map.total_bytes, 3 * max + 1 + 7);
        assert_eq!(
            map.iter().map(PeerSummary::total_bytes).sum::<u128>(),
            map.total_bytes
        );
    }

    #[test]
    fn result_does_not_depend_on_iteration_order() {
        let mut raw = HashMap::new();
        raw.insert("9".to_string(), link("200::a", 1, 1, "[1]"));
        raw.insert("10".to_string(), link("200::a", 2, 2, "[1]"));
        raw.insert("2".to_string(), link("200::a", 3, 3, "[1]"));
        let map = aggregate(&raw);

        let peer = &map.peers["200::a"];
        assert_eq!(peer.link_ids, vec!["2", "9", "10"]);
        assert_eq!(peer.total_bytes(), 12);
    }

    #[test]
    fn first_seen_coords_are_kept() {
        let raw = links(&[
            ("1", link("200::a", 1, 1, "[1 2]")),
            ("2", link("200::a", 1, 1, "[9]")),
        ]);
        let map = aggregate(&raw);
        assert_eq!(map.peers["200::a"].coords, "[1 2]");
    }

    #[test]
    fn describe_links_singular_and_plural() {
        let raw = links(&[
            ("3", link("200::a", 1, 1, "[]")),
            ("1", link("200::b", 1, 1, "[1]")),
            ("2", link("200::b", 1, 1, "[1]")),
        ]);
        let map = aggregate(&raw);
        assert_eq!(map.peers["200::a"].describe_links(), "switch port 3");
        assert_eq!(map.peers["200::b"].describe_links(), "switch ports 1, 2");
        assert_eq!(map.peers["200::a"].coords_display(), "Root");
        assert_eq!(map.peers["200::b"].coords_display(), "[1]");
    }

    #[test]
    fn non_numeric_link_ids_sort_after_numeric() {
        assert_eq!(link_order("2", "10"), std::cmp::Ordering::Less);
        assert_eq!(link_order("x", "10"), std::cmp::Ordering::Greater);
        assert_eq!(link_order("a", "b"), std::cmp::Ordering::Less);
    }
}
