use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use galleria::account::repository::InMemoryUserRepository;
use galleria::auth::repository::InMemoryRevokedTokenRepository;
use galleria::auth::TokenConfig;
use galleria::gallery::repository::{InMemoryGalleryRepository, InMemoryMediaRepository};
use galleria::routes::create_router;
use galleria::shared::AppState;
use galleria::storage::LocalMediaStore;

/// A full application wired against in-memory repositories and a
/// temporary media directory, exercised through `oneshot` requests.
pub struct TestApp {
    pub router: Router,
    media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let media_dir = TempDir::new().unwrap();
        let media_root = media_dir.path().to_path_buf();
        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryRevokedTokenRepository::new()),
            Arc::new(InMemoryGalleryRepository::new()),
            Arc::new(InMemoryMediaRepository::new()),
            Arc::new(LocalMediaStore::new(media_root.clone())),
            media_root,
            TokenConfig::new(),
        );
        Self {
            router: create_router(state),
            media_dir,
        }
    }

    pub fn media_root(&self) -> &Path {
        self.media_dir.path()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.run(request).await
    }

    /// Multipart upload with one gallery id text field and any number of
    /// (filename, bytes) file parts under the given file field name.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        id_field: &str,
        gallery_id: &str,
        file_field: &str,
        files: &[(&str, &[u8])],
    ) -> (StatusCode, Value) {
        let boundary = "galleria-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{id_field}\"\r\n\r\n{gallery_id}\r\n"
            )
            .as_bytes(),
        );
        for (file_name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{file_field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        self.run(request).await
    }

    pub async fn signup(&self, username: &str, email: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/signup",
            None,
            Some(json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "username": username,
                "email": email,
                "contact": "9876543210",
                "password": "Sup3r@secret"
            })),
        )
        .await
    }

    /// Signs up and signs in, returning (access, refresh).
    pub async fn registered_user(&self, username: &str, email: &str) -> (String, String) {
        let (status, _) = self.signup(username, email).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, tokens) = self
            .request(
                Method::POST,
                "/signin",
                None,
                Some(json!({ "username": username, "password": "Sup3r@secret" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        (
            tokens["access"].as_str().unwrap().to_string(),
            tokens["refresh"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_gallery(&self, uri: &str, token: &str, name: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                uri,
                Some(token),
                Some(json!({ "gallery_name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn run(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
