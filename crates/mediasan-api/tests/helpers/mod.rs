//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own output and temp directories so tests can assert on
//! exactly what a request left behind.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use mediasan_api::setup::routes;
use mediasan_api::state::AppState;
use mediasan_core::Config;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

pub use routes::UPLOAD_PATH;

/// Test application: server plus the directories it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub output_dir: TempDir,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Sorted file names in the sanitized output directory.
    pub fn output_files(&self) -> Vec<String> {
        list_dir(self.output_dir.path())
    }

    /// Sorted file names in the temp staging directory.
    pub fn temp_files(&self) -> Vec<String> {
        list_dir(self.temp_dir.path())
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Setup test app with default settings.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Setup test app with extra environment-style settings layered on top.
pub async fn setup_test_app_with(vars: &[(&str, &str)]) -> TestApp {
    let output_dir = TempDir::new().unwrap();
    let temp_dir = TempDir::new().unwrap();

    let mut env: HashMap<String, String> = HashMap::new();
    env.insert(
        "SANITIZED_DIR".to_string(),
        output_dir.path().to_string_lossy().into_owned(),
    );
    env.insert(
        "UPLOAD_TEMP_DIR".to_string(),
        temp_dir.path().to_string_lossy().into_owned(),
    );
    for (key, value) in vars {
        env.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_vars(|key| env.get(key).cloned()).unwrap();
    let state = AppState::initialize(config.clone()).await.unwrap();
    let router = routes::setup_routes(&config, state);
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        output_dir,
        temp_dir,
    }
}

/// Multipart form with a single `file` part.
pub fn file_form(data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data).file_name(file_name).mime_type(mime_type),
    )
}
