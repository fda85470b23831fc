//! The stream benchmark: repeat one payload file as N multipart/mixed
//! parts, POST them in a single exchange, and time it.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::{header, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use tracing::{info, warn};

use crate::error::{BenchError, Result};
use crate::metrics::Registry;
use crate::multipart::{MultipartBuilder, OCTET_STREAM};
use crate::protocol::{self, Connection, Protocol};

pub const ROOT_METRIC_NAME: &str = "http_stream_message";
const FULL_RESULT: &str = "_full_result";

/// Inputs of one `stream` run.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Protocol preference order; the first successful handshake wins.
    pub protocols: Vec<Protocol>,
    pub url: String,
    /// Number of multipart parts to stream.
    pub entities: usize,
    /// Advertised payload size. Logged only; actual part sizes come from
    /// the payload file.
    pub payload_size: u64,
    pub payload_path: String,
    pub verbose: bool,
}

/// Outcome of a run that reached the network.
#[derive(Debug)]
pub struct StreamReport {
    pub metric_name: String,
    pub protocol: Protocol,
    pub status: StatusCode,
    pub body: String,
    pub elapsed: Duration,
}

/// Stream `entities` copies of the payload file to the endpoint as one
/// multipart/mixed POST, recording the elapsed time under
/// `http_stream_message_<entities>_full_result`.
///
/// Returns `Ok(None)` when the payload path is empty; nothing touches the
/// network in that case.
pub async fn run(cfg: &StreamConfig, registry: &Registry) -> Result<Option<StreamReport>> {
    let metric_name = format!("{ROOT_METRIC_NAME}_{}", cfg.entities);
    println!("Starting upload testing for {metric_name}");

    if cfg.payload_path.is_empty() {
        println!("Please provide a valid path of the file to be uploaded");
        return Ok(None);
    }

    info!(
        url = %cfg.url,
        entities = cfg.entities,
        payload_size = cfg.payload_size,
        payload_path = %cfg.payload_path,
        "streaming multipart upload"
    );

    let payload = match tokio::fs::read(&cfg.payload_path).await {
        Ok(data) => Bytes::from(data),
        Err(err) => {
            // A missing file aborts nothing: the run keeps going and
            // streams empty parts.
            warn!(path = %cfg.payload_path, %err, "payload read failed, continuing with an empty payload");
            Bytes::new()
        }
    };

    let mut builder = MultipartBuilder::new();
    for _ in 0..cfg.entities {
        builder = builder.part(OCTET_STREAM, payload.clone());
    }
    let body = builder.build();
    let content_type = body.content_type().to_string();

    let uri: Uri = cfg
        .url
        .parse()
        .map_err(|_| BenchError::InvalidUrl(cfg.url.clone()))?;
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri.clone())
        .header(header::CONTENT_TYPE, content_type)
        .body(Full::new(body.into_bytes()))?;

    // Connection setup is not part of the timed section.
    let mut conn = protocol::connect(&cfg.protocols, &uri).await?;
    let protocol = conn.protocol();

    registry.timer(&metric_name);
    let full_result = registry.timer(&format!("{metric_name}{FULL_RESULT}"));

    let guard = full_result.start();
    let started = Instant::now();
    let outcome = exchange(&mut conn, req).await;
    drop(guard);
    let elapsed = started.elapsed();

    println!(
        "Total run time for [{metric_name}] is {}ms",
        elapsed.as_millis()
    );
    conn.shutdown().await;

    let (status, resp_body) = outcome?;
    if !status.is_success() || cfg.verbose {
        println!(
            "Received status code: [{}] with message [{resp_body}]",
            status.as_u16()
        );
    }

    Ok(Some(StreamReport {
        metric_name,
        protocol,
        status,
        body: resp_body,
        elapsed,
    }))
}

/// Send the request and read the response body to the end, so the timer
/// covers the complete exchange.
async fn exchange(
    conn: &mut Connection,
    req: Request<Full<Bytes>>,
) -> Result<(StatusCode, String)> {
    let resp = conn.send_request(req).await?;
    let status = resp.status();
    let bytes = resp.into_body().collect().await?.to_bytes();
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}
