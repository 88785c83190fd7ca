use std::time::Duration;

use ocds_collect::collect::CollectionRun;
use ocds_collect::config::IngestConfig;
use ocds_collect::deliver::{Deliverer, DeliveryPipeline};
use ocds_collect::error::Error;
use ocds_collect::source::{DataType, DownloadTarget};
use ocds_collect::store::ContentStore;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ingest_config(server_uri: &str) -> IngestConfig {
    IngestConfig {
        file_url: Some(format!("{server_uri}/api/v1/submit/file/")),
        item_url: Some(format!("{server_uri}/api/v1/submit/item/")),
        api_key: Some("test-key".to_string()),
    }
}

#[tokio::test]
async fn missing_api_key_refuses_activation_before_any_request() {
    let config = IngestConfig {
        file_url: Some("https://ingest.example.org/file/".to_string()),
        item_url: Some("https://ingest.example.org/item/".to_string()),
        api_key: None,
    };
    let err = DeliveryPipeline::new(&config).expect_err("pipeline must not activate");
    match err {
        Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("ingest.api_key")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_url_refuses_activation() {
    let config = IngestConfig {
        file_url: None,
        item_url: Some("https://ingest.example.org/item/".to_string()),
        api_key: Some("k".to_string()),
    };
    assert!(matches!(
        DeliveryPipeline::new(&config),
        Err(Error::Config { .. })
    ));
}

#[tokio::test]
async fn delivers_an_envelope_with_api_key_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/submit/file/"))
        .and(header("Authorization", "ApiKey test-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let run = CollectionRun::new("colombia", true);
    let store = ContentStore::new(dir.path());
    let target = DownloadTarget {
        url: "https://example.org/releases?page=1".to_string(),
        filename: "page-1-.json".to_string(),
        data_type: DataType::ReleasePackage,
    };
    let retrieved = store
        .write(&run, &target, br#"{"releases": [{"ocid": "ocds-abc-1"}]}"#)
        .unwrap();

    let pipeline = DeliveryPipeline::new(&ingest_config(&server.uri())).unwrap();
    pipeline.deliver(&run, &retrieved).await.unwrap();

    // Submission is dispatched fire-and-forget; give the spawned task a moment.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["collection_source"], "colombia");
    assert_eq!(body["collection_data_version"], run.data_version());
    assert_eq!(body["collection_sample"], 1);
    assert_eq!(body["file_url"], "https://example.org/releases?page=1");
    assert_eq!(body["file_data_type"], "release_package");
    assert_eq!(body["file_encoding"], "utf-8");
    assert_eq!(
        body["local_path"],
        retrieved.storage_path.to_string_lossy().as_ref()
    );
    assert_eq!(body["file_name"], body["local_path"]);
    assert_eq!(body["data"]["releases"][0]["ocid"], "ocds-abc-1");
}

#[tokio::test]
async fn invalid_json_surfaces_a_parse_error_and_sends_nothing() {
    let server = MockServer::start().await;
    // No mounted expectations: any request would fail verification.

    let dir = tempdir().unwrap();
    let run = CollectionRun::new("colombia", false);
    let store = ContentStore::new(dir.path());
    let target = DownloadTarget {
        url: "https://example.org/releases?page=1".to_string(),
        filename: "page-1-.json".to_string(),
        data_type: DataType::ReleasePackage,
    };
    let retrieved = store
        .write(&run, &target, b"<html>not json</html>")
        .unwrap();

    let pipeline = DeliveryPipeline::new(&ingest_config(&server.uri())).unwrap();
    let err = pipeline
        .deliver(&run, &retrieved)
        .await
        .expect_err("malformed stored content must surface as a parse error");
    assert!(matches!(err, Error::Parse { .. }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(server.received_requests().await.unwrap().is_empty());
}
