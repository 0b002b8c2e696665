//! HTML rendering of the peer dashboard.
//!
//! The page itself comes from a template file on disk. Two tokens are
//! replaced per request: [`HOSTNAME_TOKEN`] with the node name and
//! [`PEERS_TOKEN`] with either the peer chart fragment or a status message.
//! Every piece of dynamic text is escaped before it reaches the page.

use meshboard_types::{format_bytes, PeerMap};

/// Replaced with the escaped node name.
pub const HOSTNAME_TOKEN: &str = "%HOSTNAME%";

/// Replaced with the peer fragment or a status message.
pub const PEERS_TOKEN: &str = "%PEERS%";

/// Shown instead of the charts when the node has no links.
pub const NO_PEERS_NOTICE: &str = "<div>There are no connected peers at this time.</div>";

/// Escapes HTML special characters, including both quote styles.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders one chart block per peer, in address order.
///
/// Each pie chart has four slices: bytes of the peers rendered before this
/// one, this peer's sent bytes, its received bytes, and the bytes of every
/// peer rendered after it. The slices always add up to the grand total.
pub fn render_peers(peers: &PeerMap) -> String {
    if peers.is_empty() {
        return NO_PEERS_NOTICE.to_string();
    }

    let mut out = String::new();
    let mut offset = 0u128;

    for (index, peer) in peers.iter().enumerate() {
        let remainder = peers
            .total_bytes
            .saturating_sub(offset + peer.bytes_sent + peer.bytes_received);

        out.push_str("<div class='node'>\n");
        out.push_str(&format!(
            "<div class='ct-chart ct-perfect-fourth' id='ct-{index}'></div>\n"
        ));
        out.push_str(&format!(
            "<script>\nnew Chartist.Pie('#ct-{index}', {{ series: [{offset}, {sent}, {received}, {remainder}] }}, \
             {{ donut: true, donutWidth: 25, donutSolid: true, startbytes: 0, showLabel: false }});\n</script>\n",
            sent = peer.bytes_sent,
            received = peer.bytes_received,
        ));
        out.push_str(&format!(
            "<div id='ipv6'>{}</div>\n",
            escape_html(&peer.address)
        ));
        out.push_str(&format!(
            "<div>{} attached to {}</div>\n",
            escape_html(peer.coords_display()),
            escape_html(&peer.describe_links())
        ));
        out.push_str(&format!(
            "<div>{} sent</div>\n",
            format_bytes(peer.bytes_sent)
        ));
        out.push_str(&format!(
            "<div>{} received</div>\n",
            format_bytes(peer.bytes_received)
        ));
        out.push_str("</div>\n");

        offset += peer.total_bytes();
    }

    out
}

/// Substitutes both tokens in a single pass over `template`.
///
/// `node_name` is escaped here; `peers_html` is inserted as-is and must
/// already be safe markup. Inserted text is never rescanned for tokens.
pub fn fill_template(template: &str, node_name: &str, peers_html: &str) -> String {
    let node_name = escape_html(node_name);
    let replacements = [
        (HOSTNAME_TOKEN, node_name.as_str()),
        (PEERS_TOKEN, peers_html),
    ];

    let mut out = String::with_capacity(template.len() + node_name.len() + peers_html.len());
    let mut rest = template;
    loop {
        let next = replacements
            .iter()
            .filter_map(|(token, value)| rest.find(token).map(|at| (at, *token, *value)))
            .min_by_key(|(at, _, _)| *at);

        match next {
            Some((at, token, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Renders the full dashboard page for `peers`.
pub fn render_page(template: &str, node_name: &str, peers: &PeerMap) -> String {
    fill_template(template, node_name, &render_peers(peers))
}

/// Renders the page with `message` in place of the peer charts.
pub fn render_message(template: &str, node_name: &str, message: &str) -> String {
    fill_template(template, node_name, &escape_html(message))
}
