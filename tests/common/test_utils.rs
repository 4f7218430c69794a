use hf_forward::{Forwarder, SessionManager, config::EndpointConfig};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::{io::AsyncReadExt, net::TcpStream};
use wiremock::MockServer;

/// Token env var that no test ever sets.
pub const UNSET_TOKEN_ENV: &str = "HF_FORWARD_TEST_NEVER_SET";

pub const TEST_TOKEN: &str = "hf_test_token";

/// Create an endpoint config pointing at the mock server
pub fn endpoint_for(server: &MockServer, token_env: &str) -> EndpointConfig {
    EndpointConfig {
        base_url: server.uri(),
        token_env: token_env.to_string(),
    }
}

/// Create a forwarder with its own session manager, so tests never share a pool
pub fn forwarder_for(server: &MockServer) -> (Forwarder, Arc<SessionManager>) {
    let sessions = Arc::new(SessionManager::new());
    let forwarder =
        Forwarder::with_sessions(&endpoint_for(server, UNSET_TOKEN_ENV), Arc::clone(&sessions));
    (forwarder, sessions)
}

/// Create a forwarder for a hand-rolled endpoint listening at `base_url`
pub fn raw_forwarder(base_url: String) -> Forwarder {
    let config = EndpointConfig {
        base_url,
        token_env: UNSET_TOKEN_ENV.to_string(),
    };
    Forwarder::with_sessions(&config, Arc::new(SessionManager::new()))
}

/// Read one HTTP request (head and `Content-Length` body) off a raw socket
pub async fn read_request(socket: &mut TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];

    let head_end = loop {
        let n = socket.read(&mut buf).await.expect("Failed to read request");
        assert!(n > 0, "client closed before sending a request");
        received.extend_from_slice(&buf[..n]);
        if let Some(pos) = received.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&received[..head_end]).to_ascii_lowercase();
    let content_length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|value| value.trim().parse().expect("Invalid content-length"))
        .unwrap_or(0);

    while received.len() < head_end + content_length {
        let n = socket.read(&mut buf).await.expect("Failed to read request body");
        assert!(n > 0, "client closed mid-body");
        received.extend_from_slice(&buf[..n]);
    }
}

/// A 200 response that announces `declared_len` body bytes but carries only `chunks`
pub fn partial_sse_response(chunks: &[Value], declared_len: usize) -> Vec<u8> {
    let body = sse_body(chunks);
    assert!(body.len() < declared_len);
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\n\r\n{}",
        declared_len, body
    )
    .into_bytes()
}

/// Render values as an SSE-style body of `data:` frames
pub fn sse_body(chunks: &[Value]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("data:{}\n\n", chunk))
        .collect()
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
endpoint:
  base_url: "http://127.0.0.1:8008"
  token_env: "REFACT_TOKEN"
logs:
  level: "debug"
defaults:
  model: "bigcode/starcoderbase"
  stream: true
  parameters:
    max_new_tokens: 64
    temperature: 0.1
"#;
