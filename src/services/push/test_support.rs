//! In-process stand-in for a push provider's HTTP API.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri, header};
use tokio::net::TcpListener;

use crate::models::Device;

/// One request as the mock server received it
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    /// Decodes an `application/x-www-form-urlencoded` body, keeping repeated keys
    pub fn form(&self) -> Vec<(String, String)> {
        let body = std::str::from_utf8(&self.body).expect("request body is not UTF-8");
        let url = reqwest::Url::parse(&format!("http://mock/?{}", body)).expect("invalid form body");
        url.query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    pub fn form_values(&self, key: &str) -> Vec<String> {
        self.form()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }
}

type Responder = Arc<dyn Fn(&CapturedRequest) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    responder: Responder,
}

/// HTTP server bound to an ephemeral localhost port that records every request
pub struct MockServer {
    base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockServer {
    /// Starts a server whose response is computed from each captured request
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&CapturedRequest) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            captured: captured.clone(),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(capture).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
        }
    }

    /// Starts a server that always answers with the same status and body
    pub async fn respond_with(status: StatusCode, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone())).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("mock state poisoned").clone()
    }
}

async fn capture(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(HeaderName, &'static str); 1], String) {
    let request = CapturedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body: body.to_vec(),
    };
    let (status, response) = (state.responder)(&request);
    state
        .captured
        .lock()
        .expect("mock state poisoned")
        .push(request);
    (status, [(header::CONTENT_TYPE, "application/json")], response)
}

/// Client that never routes through a system proxy, so localhost is reached directly
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build test client")
}

pub fn devices(tokens: &[&str]) -> Vec<Device> {
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| Device {
            id: index as i32 + 1,
            ..Device::from_token(*token)
        })
        .collect()
}
