//! Admin endpoint addresses.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::AdminError;

/// Where the admin endpoint of the mesh node listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEndpoint {
    /// A local stream socket, written as `unix:///path/to/socket`.
    Unix(PathBuf),
    /// A TCP endpoint, written as `tcp://host:port` or plain `host:port`.
    Tcp(String),
}

impl AdminEndpoint {
    fn invalid(address: &str, reason: impl Into<String>) -> AdminError {
        AdminError::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_url(s: &str) -> Result<Self, AdminError> {
        let url = Url::parse(s).map_err(|e| Self::invalid(s, e.to_string()))?;
        match url.scheme() {
            "unix" => {
                let path = urlencoding::decode(url.path())
                    .map_err(|_| Self::invalid(s, "socket path is not valid UTF-8"))?;
                if path.is_empty() || path == "/" {
                    return Err(Self::invalid(s, "missing socket path"));
                }
                Ok(AdminEndpoint::Unix(PathBuf::from(path.into_owned())))
            }
            "tcp" => {
                let host = url
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| Self::invalid(s, "missing host"))?;
                let port = url.port().ok_or_else(|| Self::invalid(s, "missing port"))?;
                Ok(AdminEndpoint::Tcp(format!("{host}:{port}")))
            }
            other => Err(Self::invalid(s, format!("unsupported scheme {other:?}"))),
        }
    }

    fn parse_host_port(s: &str) -> Result<Self, AdminError> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Self::invalid(s, "expected host:port"))?;
        if host.is_empty() {
            return Err(Self::invalid(s, "missing host"));
        }
        port.parse::<u16>()
            .map_err(|_| Self::invalid(s, format!("invalid port {port:?}")))?;
        Ok(AdminEndpoint::Tcp(s.to_string()))
    }
}

impl FromStr for AdminEndpoint {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Self::invalid(s, "empty address"));
        }
        if s.contains("://") {
            Self::parse_url(s)
        } else {
            Self::parse_host_port(s)
        }
    }
}

impl fmt::Display for AdminEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminEndpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            AdminEndpoint::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}
