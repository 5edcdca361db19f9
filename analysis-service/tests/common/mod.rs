#![allow(dead_code)]

use analysis_service::config::{
    AnalysisConfig, GoogleConfig, ProviderConfig, ProviderKind, ServerConfig, TelemetryConfig,
    UploadConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_PROMPT,
};
use analysis_service::services::providers::VisionProvider;
use analysis_service::services::UploadStore;
use analysis_service::startup::{AppState, Application};
use axum::body::Body;
use axum::http::Request;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><h1>Plant Analyzer</h1></body></html>";

/// A tiny but real PNG header, enough to exercise binary round-tripping.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0xff, 0xfe,
];

/// Scratch directories backing a test configuration.
pub struct TestDirs {
    pub upload: TempDir,
    pub public: TempDir,
}

impl TestDirs {
    pub fn new() -> Self {
        let public = tempfile::tempdir().expect("Failed to create public dir");
        std::fs::write(public.path().join("index.html"), INDEX_HTML)
            .expect("Failed to write index.html");

        Self {
            upload: tempfile::tempdir().expect("Failed to create upload dir"),
            public,
        }
    }

    /// Number of files currently in the upload directory.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(self.upload.path())
            .expect("Failed to read upload dir")
            .count()
    }
}

pub fn test_config(upload_dir: &Path, public_dir: &Path) -> AnalysisConfig {
    AnalysisConfig {
        common: CoreConfig { port: 0 },
        provider: ProviderConfig {
            kind: ProviderKind::Mock,
            prompt: DEFAULT_PROMPT.to_string(),
        },
        google: GoogleConfig {
            api_key: Secret::new(String::new()),
            model: "gemini-1.5-flash".to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: 5,
        },
        upload: UploadConfig {
            dir: upload_dir.to_path_buf(),
            max_bytes: 1024 * 1024,
            cleanup_on_error: false,
        },
        server: ServerConfig {
            public_dir: public_dir.to_path_buf(),
        },
        telemetry: TelemetryConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Router state without a listener, for `oneshot` tests.
pub async fn test_state(
    dirs: &TestDirs,
    provider: Arc<dyn VisionProvider>,
    configure: impl FnOnce(&mut AnalysisConfig),
) -> AppState {
    let mut config = test_config(dirs.upload.path(), dirs.public.path());
    configure(&mut config);

    let uploads = UploadStore::new(&config.upload.dir)
        .await
        .expect("Failed to open upload store");

    AppState {
        config,
        provider,
        uploads,
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub dirs: TestDirs,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(provider: Arc<dyn VisionProvider>) -> Self {
        Self::spawn_with(provider, |_| {}).await
    }

    pub async fn spawn_with(
        provider: Arc<dyn VisionProvider>,
        configure: impl FnOnce(&mut AnalysisConfig),
    ) -> Self {
        let dirs = TestDirs::new();
        let mut config = test_config(dirs.upload.path(), dirs.public.path());
        configure(&mut config);

        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            dirs,
            client,
        }
    }

    /// Post `bytes` as the `image` field of a multipart form.
    pub async fn post_image(&self, bytes: &[u8], file_name: &str, mime: &str) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().part(
            "image",
            reqwest::multipart::Part::bytes(bytes.to_vec())
                .file_name(file_name.to_string())
                .mime_str(mime)
                .expect("Invalid mime type"),
        );

        self.post_form(form).await
    }

    pub async fn post_form(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/analyze", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// One part of a hand-built multipart body.
pub struct RawPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

const BOUNDARY: &str = "----analysis-test-boundary";

/// Build a `multipart/form-data` request for `oneshot` tests.
pub fn multipart_request(uri: &str, parts: &[RawPart<'_>]) -> Request<Body> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("Failed to build multipart request")
}
