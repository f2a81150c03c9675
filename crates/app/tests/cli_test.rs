//! End-to-end tests for the `portage` commands
//!
//! These drive the same handlers the binary calls, against a temporary
//! workspace store and real files.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::{TempDir, tempdir};

use portage::commands::{detect, export, import, list, preview};
use portage::{AppConfig, CliError, ImportRequest};
use portage_application::ApplicationError;
use portage_application::ports::WorkspaceStore;
use portage_application::use_cases::{DuplicateHandling, SnapshotScope};
use portage_domain::{ExportFormat, ExportOptions, Resolution};
use portage_infrastructure::{JsonFileStore, TokioFileSystem};

const POSTMAN_V2: &str = r#"{
  "info": {
    "_postman_id": "8f0c",
    "name": "Pet Store",
    "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
  },
  "item": [
    {
      "name": "Pets",
      "item": [
        {
          "name": "List pets",
          "request": {
            "method": "GET",
            "header": [{"key": "Accept", "value": "application/json"}],
            "url": "{{base}}/pets"
          }
        },
        {
          "name": "Create pet",
          "request": {
            "method": "POST",
            "url": "{{base}}/pets",
            "body": {"mode": "raw", "raw": "{\"name\": \"Rex\"}"}
          }
        }
      ]
    },
    {
      "name": "Health",
      "request": {"method": "GET", "url": "{{base}}/health"}
    }
  ],
  "variable": [{"key": "base", "value": "https://pets.test"}]
}"#;

struct Workspace {
    dir: TempDir,
    config: AppConfig,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        let config = AppConfig {
            store_path: dir.path().join("workspace.json"),
            ..AppConfig::default()
        };
        Self { dir, config }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn store(&self) -> JsonFileStore<TokioFileSystem> {
        JsonFileStore::new(TokioFileSystem::new(), &self.config.store_path)
    }

    async fn import(&self, path: &Path, request: ImportRequest) -> Result<String, CliError> {
        import(&self.config, path, request).await
    }
}

#[tokio::test]
async fn test_detect_reports_dialect() {
    let ws = Workspace::new();
    let path = ws.file("pets.json", POSTMAN_V2);

    let output = detect(&ws.config, &path, false).await.unwrap();
    assert!(output.starts_with("Postman Collection v2"));
    assert!(output.contains("accepted"));
}

#[tokio::test]
async fn test_preview_does_not_write() {
    let ws = Workspace::new();
    let path = ws.file("pets.json", POSTMAN_V2);

    let output = preview(&ws.config, &path, false).await.unwrap();
    assert!(output.contains("collection: Pet Store"));
    assert!(output.contains("1 folder(s), 3 request(s)"));
    assert!(!ws.config.store_path.exists());
}

#[tokio::test]
async fn test_import_then_export_native() {
    let ws = Workspace::new();
    let path = ws.file("pets.json", POSTMAN_V2);

    let output = ws.import(&path, ImportRequest::default()).await.unwrap();
    assert!(output.contains("imported 1 folder(s), 3 request(s), 0 environment(s)"));

    let collections = ws.store().list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, "Pet Store");
    let id = collections[0].id.clone().unwrap();

    let listing = list(&ws.config).await.unwrap();
    assert!(listing.contains(&id));

    let content = export(
        &ws.config,
        &SnapshotScope::Collection(id),
        &ExportOptions::new(ExportFormat::Native),
        None,
    )
    .await
    .unwrap();
    let document: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(document["type"], "portage-collection-export");
    assert_eq!(document["collection"]["name"], "Pet Store");
    assert_eq!(document["collection"]["variables"]["base"], "https://pets.test");
    assert_eq!(document["requests"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_export_to_file_round_trips_through_detection() {
    let ws = Workspace::new();
    let path = ws.file("pets.json", POSTMAN_V2);
    ws.import(&path, ImportRequest::default()).await.unwrap();
    let id = ws.store().list_collections().await.unwrap()[0]
        .id
        .clone()
        .unwrap();

    let output_path = ws.dir.path().join("out").join("pets-v2.json");
    let summary = export(
        &ws.config,
        &SnapshotScope::Collection(id),
        &ExportOptions::new(ExportFormat::PostmanV2),
        Some(&output_path),
    )
    .await
    .unwrap();
    assert!(summary.contains("3 request(s)"));

    let detected = detect(&ws.config, &output_path, false).await.unwrap();
    assert!(detected.starts_with("Postman Collection v2"));
}

#[tokio::test]
async fn test_environment_conflicts_need_a_decision() {
    let ws = Workspace::new();
    let path = ws.file("staging.env", "API_KEY=abc123\nBASE_URL=https://x.test\n");

    ws.import(&path, ImportRequest::default()).await.unwrap();

    let err = ws.import(&path, ImportRequest::default()).await.unwrap_err();
    match err {
        CliError::PendingConflicts { pending, listing } => {
            assert_eq!(pending, 1);
            assert!(listing.contains("'staging'"));
        }
        other => panic!("expected pending conflicts, got {other}"),
    }
    assert_eq!(ws.store().list_environments().await.unwrap().len(), 1);

    let renamed = ImportRequest {
        duplicates: Some(DuplicateHandling::Rename),
        ..ImportRequest::default()
    };
    ws.import(&path, renamed).await.unwrap();
    assert_eq!(ws.store().list_environments().await.unwrap().len(), 2);

    let skipped = ImportRequest {
        decisions: vec![(0, Resolution::Skip)],
        ..ImportRequest::default()
    };
    ws.import(&path, skipped).await.unwrap();
    assert_eq!(ws.store().list_environments().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_export_environment_as_dotenv() {
    let ws = Workspace::new();
    let path = ws.file("staging.env", "GREETING=\"hello world\"\nTOKEN=t1\n");
    ws.import(&path, ImportRequest::default()).await.unwrap();

    let content = export(
        &ws.config,
        &SnapshotScope::Environment("staging".to_string()),
        &ExportOptions::new(ExportFormat::DotEnv),
        None,
    )
    .await
    .unwrap();
    assert_eq!(content, "GREETING=\"hello world\"\nTOKEN=t1\n");
}

#[tokio::test]
async fn test_picker_rejects_other_extensions() {
    let ws = Workspace::new();
    let path = ws.file("notes.txt", "A=1\n");

    let err = ws.import(&path, ImportRequest::default()).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Application(ApplicationError::UnsupportedFile(_))
    ));

    let dropped = ImportRequest {
        dropped: true,
        ..ImportRequest::default()
    };
    ws.import(&path, dropped).await.unwrap();
    assert_eq!(ws.store().list_environments().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unrecognized_document_is_rejected() {
    let ws = Workspace::new();
    let path = ws.file("data.json", r#"{"hello": "world"}"#);

    let err = ws.import(&path, ImportRequest::default()).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Application(ApplicationError::Detection { format: None, .. })
    ));
    assert!(!ws.config.store_path.exists());
}

#[tokio::test]
async fn test_export_into_directory_uses_suggested_name() {
    let ws = Workspace::new();
    let path = ws.file("staging.env", "TOKEN=t1\n");
    ws.import(&path, ImportRequest::default()).await.unwrap();

    let out_dir = ws.dir.path().join("exports");
    std::fs::create_dir(&out_dir).unwrap();
    export(
        &ws.config,
        &SnapshotScope::GlobalEnvironments,
        &ExportOptions::new(ExportFormat::PostmanEnvironment),
        Some(&out_dir),
    )
    .await
    .unwrap();

    let written = std::fs::read_to_string(out_dir.join("staging.json")).unwrap();
    assert!(written.contains("\"TOKEN\""));
}

#[tokio::test]
async fn test_unnamed_request_imports_under_default_name() {
    let ws = Workspace::new();
    let path = ws.file(
        "unnamed.json",
        r#"{"info":{"name":"C","schema":"https://schema.getpostman.com/json/collection/v2.1.0/"},"item":[{"request":{"method":"GET","url":"https://a.test"}}]}"#,
    );

    let output = ws.import(&path, ImportRequest::default()).await.unwrap();
    assert!(output.contains("imported 0 folder(s), 1 request(s)"));
    assert!(output.contains("Untitled Request"));

    let collections = ws.store().list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    let id = collections[0].id.clone().unwrap();
    let requests = ws.store().list_requests(&id).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "Untitled Request");
}

#[tokio::test]
async fn test_picker_accepts_dotenv_variant_files() {
    let ws = Workspace::new();
    let path = ws.file(".env.staging", "TOKEN=t1\n");

    ws.import(&path, ImportRequest::default()).await.unwrap();
    let environments = ws.store().list_environments().await.unwrap();
    assert_eq!(environments.len(), 1);
    assert_eq!(environments[0].name, "staging");
}
