use super::*;
use pricewatch::config::{load_tasks, FetchConfig};
use pricewatch::fetcher::HttpFetcher;
use pricewatch::notification::NotifierGateway;
use pricewatch::store::FileStore;
use pricewatch::{AppConfig, RunSummary, RunnerContext, Supervisor};
use std::sync::Arc;

fn write_conf_dir(tasks: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("conf.json"),
        r#"{
            "Smtp": {"Server": "smtp.example.com", "Port": 587, "User": "me@example.com", "Password": "pw"},
            "storage": {"price_dir": "/tmp/pricewatch-test"}
        }"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("task.json"), tasks).unwrap();
    dir
}

#[test]
fn test_conf_dir_round_trip() {
    let dir = write_conf_dir(
        r#"[{
            "Name": "kindle",
            "Description": "e-reader",
            "Url": "https://shop.example.com/kindle",
            "Regexp": "price: ([0-9.]+)",
            "Period": 30,
            "Email": {"Recipients": ["me@example.com"], "Subject": "{name}", "Content": "{price}"}
        }]"#,
    );

    let config = AppConfig::load(dir.path()).unwrap();
    assert_eq!(config.smtp.port, 587);
    assert_eq!(config.storage.price_dir.to_str(), Some("/tmp/pricewatch-test"));

    let tasks = load_tasks(&dir.path().join("task.json")).unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].validate().is_ok());
}

#[test]
fn test_missing_task_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_tasks(&dir.path().join("task.json")).is_err());
}

#[tokio::test]
async fn test_no_tasks_exits_cleanly() {
    let dir = write_conf_dir("[]");
    let tasks = load_tasks(&dir.path().join("task.json")).unwrap();

    let supervisor = Supervisor::new(RunnerContext {
        fetcher: Arc::new(HttpFetcher::new(&FetchConfig::default()).unwrap()),
        store: Arc::new(FileStore::new(dir.path().join("price"))),
        gateway: NotifierGateway::new(Arc::new(RecordingNotifier::default())),
    });

    assert_eq!(supervisor.run(tasks).await, RunSummary::default());
}
