use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use geo_audit::network::{build_client, fetch_html};
use geo_audit::{AuditOptions, FetchError};
use httpmock::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

fn options(retries: u32) -> AuditOptions {
    AuditOptions {
        allow_private_networks: true,
        retries,
        backoff: Duration::from_millis(1),
        request_timeout: Duration::from_secs(5),
        ..AuditOptions::default()
    }
}

#[tokio::test]
async fn server_errors_are_retried_then_surfaced() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(503);
    });

    let opts = options(2);
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&server.url("/flaky")).unwrap();
    let err = fetch_html(&client, &url, &opts).await.unwrap_err();

    assert_eq!(err, FetchError::Status(503));
    assert_eq!(page.hits(), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/gone");
        then.status(404);
    });

    let opts = options(2);
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&server.url("/gone")).unwrap();
    assert_eq!(fetch_html(&client, &url, &opts).await.unwrap_err(), FetchError::Status(404));
    assert_eq!(page.hits(), 1);
}

#[tokio::test]
async fn oversized_pages_are_rejected_without_retry() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/big");
        then.status(200)
            .header("content-type", "text/html")
            .body("x".repeat(4_096));
    });

    let opts = AuditOptions {
        max_html_bytes: 1_024,
        ..options(2)
    };
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&server.url("/big")).unwrap();
    let err = fetch_html(&client, &url, &opts).await.unwrap_err();

    assert_eq!(err, FetchError::TooLarge { limit: 1_024 });
    assert_eq!(page.hits(), 1);
}

/// Serve a chunked HTML body of `chunks` x 512 bytes with no `Content-Length`.
async fn serve_chunked(chunks: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let mut response = String::from(
                "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            );
            for _ in 0..chunks {
                response.push_str(&format!("200\r\n{}\r\n", "x".repeat(512)));
            }
            response.push_str("0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}/stream"), hits)
}

#[tokio::test]
async fn streamed_body_over_limit_is_rejected() {
    let (url, hits) = serve_chunked(4).await;

    let opts = AuditOptions {
        max_html_bytes: 1_024,
        ..options(2)
    };
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&url).unwrap();
    let err = fetch_html(&client, &url, &opts).await.unwrap_err();

    assert_eq!(err, FetchError::TooLarge { limit: 1_024 });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn streamed_body_within_limit_is_read() {
    let (url, _) = serve_chunked(2).await;

    let opts = AuditOptions {
        max_html_bytes: 1_024,
        ..options(0)
    };
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&url).unwrap();
    let fetched = fetch_html(&client, &url, &opts).await.unwrap();

    assert_eq!(fetched.bytes, 1_024);
}

#[tokio::test]
async fn non_html_responses_are_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/data");
        then.status(200)
            .header("content-type", "application/json")
            .body("{}");
    });

    let opts = options(0);
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&server.url("/data")).unwrap();
    let err = fetch_html(&client, &url, &opts).await.unwrap_err();

    assert!(matches!(err, FetchError::NotHtml { ref content_type } if content_type == "application/json"));
}

#[tokio::test]
async fn fetch_sends_agent_headers_and_decodes_charset() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET)
            .path("/latin")
            .header_exists("accept-language")
            .header("user-agent", "GEOAuditBot/1.0 (+https://geo-audit.dev/bot)");
        then.status(200)
            .header("content-type", "text/html; charset=iso-8859-1")
            .body(b"<p>Caf\xe9</p>".to_vec());
    });

    let opts = options(0);
    let client = build_client(&opts).unwrap();
    let url = Url::parse(&server.url("/latin")).unwrap();
    let fetched = fetch_html(&client, &url, &opts).await.unwrap();

    page.assert();
    assert!(fetched.html.contains("Café"));
    assert_eq!(fetched.bytes, 11);
    assert!(fetched.content_type.starts_with("text/html"));
}
