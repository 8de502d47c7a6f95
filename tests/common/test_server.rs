use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use heritage::config::ServerConfig;
use heritage::server::{AppState, create_router};
use heritage::store::{SqliteStore, Store};

pub const PASSWORD: &str = "secret-pass";

/// Smallest byte strings that pass the upload signature checks.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%test document\n";

/// The router wired to a fresh database and media root in a temp directory.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    /// The `data` member of a success envelope.
    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }
}

impl TestServer {
    pub fn start() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");

        let mut config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        configure(&mut config);

        let store = SqliteStore::new(config.db_path()).expect("open store");
        store.initialize().expect("initialize store");

        let state = Arc::new(AppState::new(Arc::new(store), config));
        let router = create_router(state.clone());

        Self {
            temp_dir,
            state,
            router,
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Number of files stored under `media/<kind>`.
    pub fn media_files(&self, kind: &str) -> usize {
        std::fs::read_dir(self.data_dir().join("media").join(kind))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn builder(method: Method, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let request = Self::builder(Method::GET, path, token)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        let request = Self::builder(Method::DELETE, path, token)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    pub async fn json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let request = Self::builder(method, path, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");
        self.send(request).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.json(Method::POST, path, token, body).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.json(Method::PATCH, path, token, body).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        form: MultipartForm,
    ) -> TestResponse {
        let (content_type, body) = form.build();
        let request = Self::builder(method, path, token)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("build request");
        self.send(request).await
    }

    /// Registers an account through the API and returns a token for it.
    pub async fn user_token(&self, email: &str) -> String {
        let response = self
            .post(
                "/api/user/create/",
                None,
                serde_json::json!({"email": email, "password": PASSWORD, "name": "Test User"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register {email}");

        self.login(email, PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/user/token/",
                None,
                serde_json::json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login {email}");
        response.data()["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    pub fn store(&self) -> &dyn Store {
        self.state.store.as_ref()
    }
}

const BOUNDARY: &str = "heritage-test-boundary";

enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

/// Builds a `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the `data` part carrying the entity fields.
    pub fn data(self, fields: Value) -> Self {
        self.text("data", &fields.to_string())
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: Option<&str>, data: &[u8]) -> Self {
        self.parts.push(Part::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            data: data.to_vec(),
        });
        self
    }

    pub fn png(self, name: &str) -> Self {
        self.file(name, "photo.png", Some("image/png"), PNG_BYTES)
    }

    pub fn build(self) -> (String, Vec<u8>) {
        let mut body = Vec::new();
        for part in self.parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                        )
                        .as_bytes(),
                    );
                    if let Some(content_type) = content_type {
                        body.extend_from_slice(
                            format!("Content-Type: {content_type}\r\n").as_bytes(),
                        );
                    }
                    body.extend_from_slice(b"\r\n");
                    body.extend_from_slice(&data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }
}
