//! End-to-end runs against an in-process sink.

use std::net::SocketAddr;

use stream_bench::metrics::Registry;
use stream_bench::protocol::Protocol;
use stream_bench::sink;
use stream_bench::stream::{self, StreamConfig, ROOT_METRIC_NAME};
use tokio::net::TcpListener;

async fn spawn_sink() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, sink::router()).await.unwrap();
    });
    addr
}

fn write_payload(name: &str, contents: &[u8]) -> String {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn config(
    addr: SocketAddr,
    protocols: Vec<Protocol>,
    entities: usize,
    payload_path: String,
) -> StreamConfig {
    StreamConfig {
        protocols,
        url: format!("http://{addr}/upload"),
        entities,
        payload_size: 0,
        payload_path,
        verbose: false,
    }
}

#[tokio::test]
async fn streams_all_parts_over_http1() {
    let addr = spawn_sink().await;
    let path = write_payload("stream-bench-h1.bin", &[0xab; 4096]);
    let registry = Registry::new();
    let cfg = config(addr, vec![Protocol::Http1], 3, path);

    let report = stream::run(&cfg, &registry).await.unwrap().unwrap();

    assert_eq!(report.protocol, Protocol::Http1);
    assert!(report.status.is_success());
    assert_eq!(report.body, "accepted 3 parts");
    assert_eq!(report.metric_name, format!("{ROOT_METRIC_NAME}_3"));
    let timer = registry.timer(&format!("{ROOT_METRIC_NAME}_3_full_result"));
    assert_eq!(timer.count(), 1);
}

#[tokio::test]
async fn streams_all_parts_over_http2() {
    let addr = spawn_sink().await;
    let path = write_payload("stream-bench-h2.bin", &[0xcd; 1024]);
    let registry = Registry::new();
    let cfg = config(addr, vec![Protocol::Http2], 7, path);

    let report = stream::run(&cfg, &registry).await.unwrap().unwrap();

    assert_eq!(report.protocol, Protocol::Http2);
    assert!(report.status.is_success());
    assert_eq!(report.body, "accepted 7 parts");
}

#[tokio::test]
async fn first_listed_protocol_carries_the_request() {
    let addr = spawn_sink().await;
    let path = write_payload("stream-bench-pref.bin", b"preference");
    let registry = Registry::new();
    let cfg = config(addr, vec![Protocol::Http2, Protocol::Http1], 1, path);

    let report = stream::run(&cfg, &registry).await.unwrap().unwrap();
    assert_eq!(report.protocol, Protocol::Http2);
    assert_eq!(report.body, "accepted 1 parts");
}

#[tokio::test]
async fn missing_payload_file_still_streams_empty_parts() {
    let addr = spawn_sink().await;
    let registry = Registry::new();
    let cfg = config(
        addr,
        vec![Protocol::Http1],
        2,
        "/definitely/not/a/real/payload.bin".to_string(),
    );

    let report = stream::run(&cfg, &registry).await.unwrap().unwrap();
    assert!(report.status.is_success());
    assert_eq!(report.body, "accepted 2 parts");
}

#[tokio::test]
async fn failed_exchange_still_records_one_sample() {
    // A server that accepts connections and immediately hangs up, so the
    // handshake succeeds but the exchange fails.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            drop(stream);
        }
    });

    let path = write_payload("stream-bench-fail.bin", b"doomed");
    let registry = Registry::new();
    let cfg = config(addr, vec![Protocol::Http1], 2, path);

    let result = stream::run(&cfg, &registry).await;
    assert!(result.is_err());

    let timer = registry.timer(&format!("{ROOT_METRIC_NAME}_2_full_result"));
    assert_eq!(timer.count(), 1);
}

#[tokio::test]
async fn both_metric_names_are_registered() {
    let addr = spawn_sink().await;
    let path = write_payload("stream-bench-names.bin", b"names");
    let registry = Registry::new();
    let cfg = config(addr, vec![Protocol::Http1], 4, path);

    stream::run(&cfg, &registry).await.unwrap().unwrap();

    assert_eq!(
        registry.names(),
        vec![
            format!("{ROOT_METRIC_NAME}_4"),
            format!("{ROOT_METRIC_NAME}_4_full_result"),
        ]
    );
    // The plain timer is registered but only the timed exchange records.
    assert_eq!(registry.timer(&format!("{ROOT_METRIC_NAME}_4")).count(), 0);
}
