//! Runs `HttpRequestor` against an in-process server that speaks just enough HTTP/1.1 to
//! answer a single request with a canned response.
use bytes::Bytes;
use grpcweb_core::transport::{Requestor, WebRequest};
use grpcweb_core::wire::{self, ResponseKind};
use grpcweb_core::{CallError, CallEvent, ClientConfig, Format, GrpcWebClient, HttpRequestor};
use http::{HeaderMap, Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const PATH: &str = "/echo.EchoService/UnaryEcho";

fn http_response(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status_line}\r\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "content-length: {}\r\nconnection: close\r\n\r\n",
        body.len()
    ));

    let mut out = out.into_bytes();
    out.extend_from_slice(body);
    out
}

/// Accepts one connection, answers it with `response` and hands back the raw request.
async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(&response).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });

    (format!("http://{addr}{PATH}"), handle)
}

async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);

        if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);

            if request.len() >= end + 4 + body_len {
                break;
            }
        }
    }

    request
}

fn setup_client(format: Format) -> GrpcWebClient {
    let config = ClientConfig::builder(HttpRequestor::new())
        .format(format)
        .build()
        .expect("Failed to build client config");

    GrpcWebClient::new(config)
}

fn utf8(bytes: Bytes) -> Result<String, grpcweb_core::codec::CodecError> {
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_successful_response_is_returned_unchanged() {
    let body = b"\x00\x00\x00\x00\x02hi".to_vec();
    let (url, server) = serve_once(http_response(
        "200 OK",
        &[
            ("content-type", "application/grpc-web+proto"),
            ("x-served-by", "in-process"),
        ],
        &body,
    ))
    .await;

    let request = WebRequest {
        method: Method::POST,
        url,
        headers: HeaderMap::new(),
        body: Bytes::from_static(b"request body"),
        response_kind: ResponseKind::Bytes,
    };
    let response = HttpRequestor::new().issue(request).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers["content-type"],
        "application/grpc-web+proto"
    );
    assert_eq!(response.headers["x-served-by"], "in-process");
    assert_eq!(response.body, body);

    let raw = server.await.unwrap();
    assert!(raw.starts_with(format!("POST {PATH} HTTP/1.1").as_bytes()));
    assert!(raw.ends_with(b"request body"));
}

#[tokio::test]
async fn test_call_over_http() {
    let mut body = wire::encode(b"pong").to_vec();
    body.extend_from_slice(b"\x80\x00\x00\x00\x10grpc-status: 0\r\n");
    let (url, server) = serve_once(http_response(
        "200 OK",
        &[("content-type", "application/grpc-web+proto")],
        &body,
    ))
    .await;

    let client = setup_client(Format::Binary);
    let mut events = Vec::new();
    client
        .rpc_call(&url, Bytes::from_static(b"ping"), vec![], utf8, |e| {
            events.push(e)
        })
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], CallEvent::Message(m) if m == "pong"));
    assert!(matches!(&events[1], CallEvent::Status(s) if s.is_ok()));

    let raw = String::from_utf8_lossy(&server.await.unwrap()).to_lowercase();
    assert!(raw.contains("x-grpc-web: 1\r\n"));
    assert!(raw.contains("content-type: application/grpc-web+proto\r\n"));
}

#[tokio::test]
async fn test_http_error_status_is_a_transport_failure() {
    let (url, _server) = serve_once(http_response(
        "500 Internal Server Error",
        &[("grpc-status", "0"), ("grpc-message", "ignored")],
        b"",
    ))
    .await;

    let client = setup_client(Format::Text);
    let mut events = Vec::new();
    client
        .rpc_call(&url, Bytes::new(), vec![], utf8, |e| events.push(e))
        .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        CallEvent::Failed(CallError::Transport(e)) => {
            assert!(e.message.contains("500"), "unexpected message: {}", e.message);
            assert!(e.message.contains("Internal Server Error"));
        }
        other => panic!("Expected a transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = setup_client(Format::Text);
    let mut events = Vec::new();
    client
        .rpc_call(
            &format!("http://{addr}{PATH}"),
            Bytes::new(),
            vec![],
            utf8,
            |e| events.push(e),
        )
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        CallEvent::Failed(CallError::Transport(_))
    ));
}
