//! Admin endpoint client.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{decode_body, unwrap_envelope, AdminRequest, SwitchPeers};
use crate::{AdminEndpoint, AdminError};

/// Upper bound on the size of a single response document (16 MiB).
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Default bound on one complete request/response exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Queries the admin endpoint of a mesh node.
///
/// Every query opens a fresh connection that is closed before the query
/// returns, so a client can be shared freely between concurrent requests.
#[derive(Debug, Clone)]
pub struct AdminClient {
    endpoint: AdminEndpoint,
    timeout: Duration,
}

impl AdminClient {
    pub fn new(endpoint: AdminEndpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn endpoint(&self) -> &AdminEndpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request and returns the raw response envelope.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Timeout` if the whole exchange takes longer than
    /// the configured timeout, and the matching variant for connection,
    /// encoding, I/O and decoding failures.
    pub async fn query(&self, request: &AdminRequest) -> Result<Value, AdminError> {
        let payload = serde_json::to_vec(request).map_err(AdminError::Encode)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            request = %request.request,
            "querying admin endpoint"
        );

        match tokio::time::timeout(self.timeout, self.connect_and_exchange(&payload)).await {
            Ok(result) => result,
            Err(_) => Err(AdminError::Timeout(self.timeout)),
        }
    }

    /// Fetches the link table of the node.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`AdminClient::query`], returns
    /// `AdminError::Unsuccessful` when the endpoint reports a failure status
    /// and `AdminError::Schema` when the body does not match [`SwitchPeers`].
    pub async fn get_switch_peers(&self) -> Result<SwitchPeers, AdminError> {
        let envelope = self.query(&AdminRequest::get_switch_peers()).await?;
        let peers: SwitchPeers = decode_body(unwrap_envelope(envelope)?)?;
        tracing::debug!(links = peers.switchpeers.len(), "received switch peers");
        Ok(peers)
    }

    async fn connect_and_exchange(&self, payload: &[u8]) -> Result<Value, AdminError> {
        let connect_error = |source| AdminError::Connect {
            endpoint: self.endpoint.to_string(),
            source,
        };

        match &self.endpoint {
            #[cfg(unix)]
            AdminEndpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(connect_error)?;
                exchange(stream, payload).await
            }
            #[cfg(not(unix))]
            AdminEndpoint::Unix(_) => Err(connect_error(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "unix sockets are not available on this platform",
            ))),
            AdminEndpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str())
                    .await
                    .map_err(connect_error)?;
                exchange(stream, payload).await
            }
        }
    }
}

/// Writes `payload` to `stream` and reads back one JSON document.
///
/// The stream is consumed and dropped, closing the connection.
pub(crate) async fn exchange<S>(mut stream: S, payload: &[u8]) -> Result<Value, AdminError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(payload).await?;
    stream.flush().await?;
    read_document(&mut stream, MAX_RESPONSE_BYTES).await
}

/// Reads from `reader` until one complete JSON document has arrived.
///
/// The document may arrive split across any number of reads. Each byte is
/// scanned once to find where the top-level value ends, and the document is
/// decoded once when it does. Bytes after the first document are ignored,
/// and the reader is not drained to EOF, so endpoints that keep the
/// connection open are supported.
pub(crate) async fn read_document<R>(reader: &mut R, limit: usize) -> Result<Value, AdminError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    let mut scanner = DocumentScanner::default();

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.iter().all(u8::is_ascii_whitespace) {
                return Err(AdminError::NoResponse);
            }
            // Closed mid-document.
            return serde_json::from_slice(&buf).map_err(AdminError::Decode);
        }
        if buf.len() + n > limit {
            return Err(AdminError::ResponseTooLarge { limit });
        }
        buf.extend_from_slice(&chunk[..n]);

        let document = match scanner.scan(&buf) {
            Scan::Incomplete => None,
            Scan::Complete(end) => {
                Some(serde_json::from_slice(&buf[..end]).map_err(AdminError::Decode)?)
            }
            Scan::Scalar => first_document(&buf).map_err(AdminError::Decode)?,
        };
        if let Some(document) = document {
            tracing::trace!(bytes = buf.len(), "decoded admin response");
            return Ok(document);
        }
    }
}

/// Outcome of scanning the bytes received so far.
#[derive(Debug, PartialEq, Eq)]
enum Scan {
    /// The top-level value is still open.
    Incomplete,
    /// The top-level value ends at this offset.
    Complete(usize),
    /// The document does not start with an object, array or string.
    Scalar,
}

/// Tracks nesting and string state of the first JSON value across reads.
#[derive(Debug, Default)]
struct DocumentScanner {
    scanned: usize,
    depth: usize,
    started: bool,
    in_string: bool,
    escaped: bool,
    scalar: bool,
}

impl DocumentScanner {
    /// Advances over the bytes of `buf` appended since the last call.
    fn scan(&mut self, buf: &[u8]) -> Scan {
        if self.scalar {
            return Scan::Scalar;
        }

        while let Some(&byte) = buf.get(self.scanned) {
            self.scanned += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Scan::Complete(self.scanned);
                    }
                }
                continue;
            }

            if !self.started {
                match byte {
                    b'{' | b'[' => self.depth = 1,
                    b'"' => self.in_string = true,
                    b if b.is_ascii_whitespace() => continue,
                    _ => {
                        self.scalar = true;
                        return Scan::Scalar;
                    }
                }
                self.started = true;
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Scan::Complete(self.scanned);
                    }
                }
                _ => {}
            }
        }

        Scan::Incomplete
    }
}

/// Decodes the first JSON value in `buf`, or `None` if more bytes are needed.
fn first_document(buf: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    let mut values = serde_json::Deserializer::from_slice(buf).into_iter::<Value>();
    match values.next() {
        None => Ok(None),
        Some(Ok(value)) => Ok(Some(value)),
        Some(Err(e)) if e.is_eof() => Ok(None),
        Some(Err(e)) => Err(e),
    }
}
