use super::*;
use pricewatch::config::FetchConfig;
use pricewatch::fetcher::HttpFetcher;
use pricewatch::notification::NotifierGateway;
use pricewatch::store::{BestValueStore, FileStore};
use pricewatch::{PollOutcome, RunnerContext, Task, TaskRunner};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn mount_bodies(server: &MockServer, bodies: &[&str]) {
    for body in bodies {
        Mock::given(method("GET"))
            .and(path("/item"))
            .respond_with(ResponseTemplate::new(200).set_body_string(*body))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
}

fn runner_for(
    server: &MockServer,
    store: Arc<FileStore>,
    notifier: Arc<RecordingNotifier>,
) -> TaskRunner {
    let mut task = Task::new(
        "X",
        &format!("{}/item", server.uri()),
        r"price: ([0-9.]+)",
        1,
    )
    .with_recipients(&["buyer@example.com"]);
    task.email.subject = "{name} dropped to {price}".to_string();
    task.email.content = "See {url}".to_string();

    let ctx = RunnerContext {
        fetcher: Arc::new(HttpFetcher::new(&FetchConfig::default()).unwrap()),
        store,
        gateway: NotifierGateway::new(notifier),
    };
    TaskRunner::new(task, ctx).unwrap()
}

#[tokio::test]
async fn test_price_drops_are_stored_and_notified() {
    let server = MockServer::start().await;
    mount_bodies(&server, &["price: 19.99", "price: 25.50", "price: 15.00"]).await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path().join("price")));
    let notifier = Arc::new(RecordingNotifier::default());
    let runner = runner_for(&server, store.clone(), notifier.clone());

    runner.poll_once().await.unwrap();
    let on_disk = std::fs::read_to_string(dir.path().join("price/X")).unwrap();
    assert_eq!(on_disk, "19.99");

    assert!(matches!(
        runner.poll_once().await.unwrap(),
        PollOutcome::NotImproved { .. }
    ));

    runner.poll_once().await.unwrap();
    assert_eq!(store.read("X").await, Some(dec("15.00")));

    let events = notifier.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].subject, "X dropped to 19.99");
    assert_eq!(events[0].body, format!("See {}/item", server.uri()));
    assert_eq!(events[0].recipients, vec!["buyer@example.com".to_string()]);
    assert_eq!(events[1].subject, "X dropped to 15.00");
}

#[tokio::test]
async fn test_server_errors_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_bodies(&server, &["price: 42.00"]).await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let notifier = Arc::new(RecordingNotifier::default());
    let runner = runner_for(&server, store.clone(), notifier.clone());

    assert_eq!(runner.poll_once().await.unwrap(), PollOutcome::FetchFailed);
    assert_eq!(store.read("X").await, None);

    assert!(matches!(
        runner.poll_once().await.unwrap(),
        PollOutcome::Improved { .. }
    ));
    assert_eq!(store.read("X").await, Some(dec("42.00")));
}

#[tokio::test]
async fn test_best_value_survives_restart() {
    let server = MockServer::start().await;
    mount_bodies(&server, &["price: 19.99", "price: 19.99"]).await;

    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());

    let first = runner_for(&server, Arc::new(FileStore::new(dir.path())), notifier.clone());
    first.poll_once().await.unwrap();
    drop(first);

    let restarted = runner_for(&server, Arc::new(FileStore::new(dir.path())), notifier.clone());
    assert_eq!(
        restarted.poll_once().await.unwrap(),
        PollOutcome::NotImproved {
            value: dec("19.99"),
            best: dec("19.99"),
        }
    );
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn test_mail_failure_does_not_undo_store() {
    let server = MockServer::start().await;
    mount_bodies(&server, &["price: 19.99", "price: 18.00"]).await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let notifier = Arc::new(RecordingNotifier::failing());
    let runner = runner_for(&server, store.clone(), notifier.clone());

    assert_eq!(
        runner.poll_once().await.unwrap(),
        PollOutcome::Improved {
            value: dec("19.99"),
            previous: None,
            delivery: None,
        }
    );
    assert_eq!(store.read("X").await, Some(dec("19.99")));

    assert!(matches!(
        runner.poll_once().await.unwrap(),
        PollOutcome::Improved { delivery: None, .. }
    ));
    assert_eq!(store.read("X").await, Some(dec("18.00")));
}
