use crate::client::fake::FakeClient;
use crate::client::CaseClient;
use crate::config::{AppState, Settings};
use crate::routes::build_app;
use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

/// The full application wired to a [`FakeClient`].
pub struct TestApp {
    pub client: Arc<FakeClient>,
    pub settings: Settings,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new(FakeClient::default())
    }
}

impl TestApp {
    pub fn new(client: FakeClient) -> Self {
        Self {
            client: Arc::new(client),
            settings: Settings::default(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.settings.prefix = prefix.to_string();
        self
    }

    pub fn router(&self) -> Router {
        let client: Arc<dyn CaseClient> = self.client.clone();
        build_app(Arc::new(AppState::new(self.settings.clone(), client)))
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(COOKIE, "XSRF-TOKEN=abc%3D; OPG-Session=session-1")
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, "XSRF-TOKEN=abc%3D; OPG-Session=session-1")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("xsrfToken=posted-token&{form}")))
        .unwrap()
}
