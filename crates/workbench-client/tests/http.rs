use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use url::Url;
use workbench_client::{error_message, ApiError, CsvUpload, HttpTransport, InteractionsClient};
use workbench_core::{CustomerId, InteractionQuery, InteractionType};

struct Captured {
    head: String,
    body: Vec<u8>,
}

fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let captured = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).expect("write response");
        captured
    });
    let url = Url::parse(&format!("http://{}/api", addr)).expect("url");
    (url, handle)
}

fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = stream.read(&mut chunk).expect("read request");
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body = &buf[end + 4..];
            if head.contains("transfer-encoding: chunked") {
                if find(body, b"0\r\n\r\n").is_some() {
                    break;
                }
                continue;
            }
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if body.len() >= length {
                break;
            }
        }
    }
    let end = find(&buf, b"\r\n\r\n").unwrap_or(buf.len());
    Captured {
        head: String::from_utf8_lossy(&buf[..end]).into_owned(),
        body: buf[(end + 4).min(buf.len())..].to_vec(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn client(url: Url) -> InteractionsClient<HttpTransport> {
    let transport =
        HttpTransport::new(url, Some(Duration::from_secs(5)), "workbench-test").expect("transport");
    InteractionsClient::new(transport)
}

const PAGE: &str = r#"{"content":[{"id":1,"productId":1001,"customerId":42,"interactionType":"EMAIL","feedback":"Great","interactionDate":"2025-01-02T10:00:00"}],"totalElements":1,"totalPages":1,"number":0,"size":10,"first":true,"last":true,"empty":false}"#;

#[test]
fn list_request_carries_filters_in_query_string() {
    let (url, server) = serve_once("200 OK", PAGE);
    let query = InteractionQuery {
        customer_id: Some(CustomerId(42)),
        interaction_type: Some(InteractionType::Email),
        ..InteractionQuery::first_page(10)
    };

    let page = client(url).fetch_interactions(&query).expect("page");
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].customer_id, CustomerId(42));

    let captured = server.join().expect("server");
    let request_line = captured.head.lines().next().expect("request line");
    assert_eq!(
        request_line,
        "GET /api/interactions?customerId=42&interactionType=EMAIL&page=0&size=10 HTTP/1.1"
    );
    assert!(captured
        .head
        .to_ascii_lowercase()
        .contains("user-agent: workbench-test"));
}

#[test]
fn csv_upload_is_multipart_with_file_field() {
    let (url, server) = serve_once("201 Created", r#"{"ingested":5}"#);
    let receipt = client(url)
        .upload_csv(CsvUpload::new(
            "batch.csv",
            b"productId,customerId,interactionType\n1,2,CHAT\n".to_vec(),
        ))
        .expect("receipt");
    assert_eq!(receipt.ingested, 5);

    let captured = server.join().expect("server");
    let head = captured.head.to_ascii_lowercase();
    assert!(head.starts_with("post /api/interactions "));
    assert!(head.contains("content-type: multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&captured.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"batch.csv\""));
    assert!(body.contains("1,2,CHAT"));
}

#[test]
fn error_payload_becomes_the_message() {
    let (url, server) = serve_once(
        "400 Bad Request",
        r#"{"error":"customerId must be positive","message":"Bad Request"}"#,
    );
    let err = client(url)
        .fetch_interactions(&InteractionQuery::first_page(10))
        .unwrap_err();
    server.join().expect("server");
    assert_eq!(err.status(), Some(400));
    assert_eq!(error_message(&err), "customerId must be positive");
}

#[test]
fn status_without_payload_uses_status_text() {
    let (url, server) = serve_once("500 Internal Server Error", "");
    let err = client(url)
        .fetch_interactions(&InteractionQuery::first_page(10))
        .unwrap_err();
    server.join().expect("server");
    assert_eq!(error_message(&err), "Request failed with status code 500");
}

#[test]
fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let url = Url::parse(&format!("http://{}/api", addr)).expect("url");
    let err = client(url)
        .fetch_interactions(&InteractionQuery::first_page(10))
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!error_message(&err).is_empty());
}
