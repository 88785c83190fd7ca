use std::io::Write;

use ocds_collect::load_config::API_KEY_ENV;
use ocds_collect::{run, Cli, Commands};
use serial_test::serial;
use tempfile::NamedTempFile;

#[tokio::test]
async fn sources_subcommand_succeeds() {
    let cli = Cli {
        command: Commands::Sources,
    };
    run(cli).await.expect("listing sources should succeed");
}

#[tokio::test]
#[serial]
async fn collect_rejects_unknown_source_ids() {
    let mut config = NamedTempFile::new().unwrap();
    config
        .write_all(b"storage_root: /tmp/ocds\ningest: {}\n")
        .unwrap();

    let cli = Cli {
        command: Commands::Collect {
            source: "atlantis".to_string(),
            config: config.path().to_path_buf(),
            sample: false,
            page: None,
        },
    };
    let err = run(cli).await.expect_err("unknown source must be rejected");
    assert!(err.to_string().contains("atlantis"));
}

#[tokio::test]
#[serial]
async fn collect_without_api_key_fails_before_any_request() {
    std::env::remove_var(API_KEY_ENV);
    let mut config = NamedTempFile::new().unwrap();
    config
        .write_all(
            b"storage_root: /tmp/ocds\n\
              ingest:\n\
                file_url: https://ingest.example.org/file/\n\
                item_url: https://ingest.example.org/item/\n",
        )
        .unwrap();

    let cli = Cli {
        command: Commands::Collect {
            source: "colombia".to_string(),
            config: config.path().to_path_buf(),
            sample: true,
            page: None,
        },
    };
    let err = run(cli)
        .await
        .expect_err("delivery must refuse to activate without an API key");
    assert!(err.to_string().contains("configuration error"));
}
