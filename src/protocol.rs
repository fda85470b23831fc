//! HTTP protocol version selection and connection establishment over
//! hyper's per-connection client API.

use bytes::Bytes;
use clap::ValueEnum;
use http::{Request, Response, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{BenchError, Result};

/// HTTP protocol version used for the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    /// HTTP/1.1.
    #[value(name = "http1", alias = "1", alias = "1.1")]
    Http1,
    /// HTTP/2 over plaintext TCP, prior knowledge.
    #[value(name = "http2", alias = "2")]
    Http2,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http1 => "HTTP/1.1",
            Self::Http2 => "HTTP/2",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One established client connection, carrying at most one in-flight
/// request. A run never opens more than one of these, so the target host
/// sees a single concurrent request.
#[derive(Debug)]
pub enum Connection {
    Http1 {
        sender: http1::SendRequest<Full<Bytes>>,
        driver: JoinHandle<()>,
    },
    Http2 {
        sender: http2::SendRequest<Full<Bytes>>,
        driver: JoinHandle<()>,
    },
}

impl Connection {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Http1 { .. } => Protocol::Http1,
            Self::Http2 { .. } => Protocol::Http2,
        }
    }

    /// Send one request and wait for the response head.
    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>> {
        let resp = match self {
            Self::Http1 { sender, .. } => sender.send_request(req).await?,
            Self::Http2 { sender, .. } => sender.send_request(req).await?,
        };
        Ok(resp)
    }

    /// Release the connection: drop the sender and wait for the spawned
    /// connection task to wind down.
    pub async fn shutdown(self) {
        let driver = match self {
            Self::Http1 { sender, driver } => {
                drop(sender);
                driver
            }
            Self::Http2 { sender, driver } => {
                drop(sender);
                driver
            }
        };
        let _ = driver.await;
    }
}

/// Resolve `uri` and complete a handshake for the first protocol in
/// `protocols` that accepts one. Plaintext `http` only; TLS stays with
/// whatever fronts the endpoint.
pub async fn connect(protocols: &[Protocol], uri: &Uri) -> Result<Connection> {
    match uri.scheme_str() {
        None | Some("http") => {}
        Some(other) => return Err(BenchError::UnsupportedScheme(other.to_string())),
    }
    let authority = uri
        .authority()
        .ok_or_else(|| BenchError::InvalidUrl(uri.to_string()))?;
    let addr = format!("{}:{}", authority.host(), authority.port_u16().unwrap_or(80));

    let mut last_err = None;
    for protocol in protocols {
        match handshake(*protocol, &addr).await {
            Ok(conn) => {
                debug!(%protocol, %addr, "handshake complete");
                return Ok(conn);
            }
            Err(err) => {
                warn!(%protocol, %addr, %err, "handshake failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or(BenchError::NoProtocols))
}

async fn handshake(protocol: Protocol, addr: &str) -> Result<Connection> {
    let io = TokioIo::new(TcpStream::connect(addr).await?);
    match protocol {
        Protocol::Http1 => {
            let (sender, conn) = http1::handshake::<_, Full<Bytes>>(io).await?;
            let driver = tokio::spawn(async move {
                let _ = conn.await;
            });
            Ok(Connection::Http1 { sender, driver })
        }
        Protocol::Http2 => {
            let (sender, conn) =
                http2::handshake::<_, _, Full<Bytes>>(TokioExecutor::default(), io).await?;
            let driver = tokio::spawn(async move {
                let _ = conn.await;
            });
            Ok(Connection::Http2 { sender, driver })
        }
    }
}
