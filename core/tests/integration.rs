//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives the
//! resource clients over real HTTP with `ReqwestTransport`. A recording
//! notifier checks that every failed call notifies exactly once and that
//! successful calls never do.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use console_api::{
    ApiClient, ApiConfig, ApiError, CreateRecordParams, CreateTaskParams, Notifier, Pagination,
    Store, StorePagination,
};
use serde_json::Value;

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for Recorder {
    fn error(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn client(base_url: &str) -> (ApiClient, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let api = ApiClient::new(ApiConfig::new(base_url)).with_notifier(recorder.clone());
    (api, recorder)
}

#[tokio::test]
async fn record_lifecycle() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);
    let records = api.records();

    // Step 1: list with default pagination — empty.
    let page = records.get_records(&Pagination::default()).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);

    // Step 2: add. The backend answers with the write result, not the record.
    let mut params = CreateRecordParams::new("alice", "rec1", "2024-03-19T10:00:00Z");
    params.client_ip = Some("10.0.0.7".to_string());
    params.action = Some("login".to_string());
    assert_eq!(records.add_record(&params).await.unwrap(), Value::Bool(true));

    // Step 3: get by composite id, twice — identical answers.
    let first = records.get_record("alice", "rec1").await.unwrap().unwrap();
    let second = records.get_record("alice", "rec1").await.unwrap();
    assert_eq!(first.name, "rec1");
    assert_eq!(first.client_ip.as_deref(), Some("10.0.0.7"));
    assert_eq!(Some(first), second);

    // Step 4: update.
    params.action = Some("logout".to_string());
    let updated = records.update_record("alice", "rec1", &params).await.unwrap();
    assert_eq!(updated, Value::Bool(true));

    // Step 5: list — one item, carrying the update.
    let page = records.get_records(&Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].action.as_deref(), Some("logout"));

    // Step 6: delete by name alone.
    let deleted = records.delete_record("rec1").await.unwrap();
    assert_eq!(deleted, Value::Bool(true));

    // Step 7: get after delete — null data.
    assert!(records.get_record("alice", "rec1").await.unwrap().is_none());
    assert!(recorder.messages().is_empty(), "successful calls must not notify");

    // Step 8: delete again — application error, one notification.
    let err = records.delete_record("rec1").await.unwrap_err();
    assert!(matches!(err, ApiError::Application { ref message } if message == "Record not found"));
    assert_eq!(recorder.messages(), vec!["Record not found".to_string()]);
}

#[tokio::test]
async fn record_pagination_error_is_reported() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);

    let err = api
        .records()
        .get_records(&Pagination::new("zero", "1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid pagination: page_size=zero, p=1");
    assert_eq!(recorder.messages().len(), 1);
}

#[tokio::test]
async fn task_lifecycle() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);
    let tasks = api.tasks();

    assert!(tasks.get_tasks("alice").await.unwrap().is_empty());

    let mut params = CreateTaskParams::new("alice", "task1", "2024-03-19T10:00:00Z", "Task 1");
    params.task_type = Some("Labeling".to_string());
    assert_eq!(tasks.add_task(&params).await.unwrap(), Value::Bool(true));

    let listed = tasks.get_tasks("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].display_name, "Task 1");
    assert_eq!(listed[0].task_type.as_deref(), Some("Labeling"));
    assert!(tasks.get_tasks("bob").await.unwrap().is_empty());

    params.display_name = "Renamed".to_string();
    let updated = tasks.update_task("alice", "task1", &params).await.unwrap();
    assert_eq!(updated, Value::Bool(true));

    let fetched = tasks.get_task("alice", "task1").await.unwrap().unwrap();
    assert_eq!(fetched.display_name, "Renamed");

    tasks.delete_task("alice", "task1").await.unwrap();
    assert!(tasks.get_task("alice", "task1").await.unwrap().is_none());
    assert!(recorder.messages().is_empty());

    let err = tasks.delete_task("alice", "task1").await.unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
    assert_eq!(recorder.messages(), vec!["Task not found".to_string()]);
}

#[tokio::test]
async fn update_of_missing_task_fails() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);

    let params = CreateTaskParams::new("alice", "ghost", "2024-03-19T10:00:00Z", "Ghost");
    let err = api
        .tasks()
        .update_task("alice", "ghost", &params)
        .await
        .unwrap_err();
    assert!(!err.is_transport());
    assert_eq!(recorder.messages(), vec!["Task not found".to_string()]);
}

#[tokio::test]
async fn store_lifecycle() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);
    let stores = api.stores();

    let store = Store {
        owner: "admin".to_string(),
        name: "store_1".to_string(),
        created_time: "2024-03-19T10:00:00Z".to_string(),
        display_name: "Store 1".to_string(),
        storage_provider: Some("provider-storage-built-in".to_string()),
        ..Store::default()
    };
    assert_eq!(stores.add_store(&store).await.unwrap(), Value::Bool(true));

    let page = stores.get_stores(&StorePagination::default()).await.unwrap();
    assert_eq!(page.items, vec![store.clone()]);
    let second = StorePagination {
        page: 2,
        ..StorePagination::default()
    };
    assert!(stores.get_stores(&second).await.unwrap().items.is_empty());

    let fetched = stores.get_store("admin", "store_1").await.unwrap();
    assert_eq!(fetched, Some(store.clone()));

    let renamed = Store {
        display_name: "Store One".to_string(),
        ..store
    };
    stores.update_store("admin", "store_1", &renamed).await.unwrap();
    let fetched = stores.get_store("admin", "store_1").await.unwrap();
    assert_eq!(fetched.map(|s| s.display_name).as_deref(), Some("Store One"));

    stores.delete_store("admin", "store_1").await.unwrap();
    assert!(stores.get_store("admin", "store_1").await.unwrap().is_none());
    assert!(recorder.messages().is_empty());
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let base = spawn_server().await;
    let (api, recorder) = client(&base);
    let tasks = api.tasks();
    let records = api.records();
    let pagination = Pagination::default();

    let (a, b, c) = tokio::join!(
        tasks.get_tasks("alice"),
        tasks.get_tasks("bob"),
        records.get_records(&pagination),
    );
    assert!(a.unwrap().is_empty());
    assert!(b.unwrap().is_empty());
    assert!(c.unwrap().items.is_empty());
    assert!(recorder.messages().is_empty());
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    // Accepts connections at the OS level but never answers.
    let silent = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = silent.local_addr().unwrap();

    let recorder = Arc::new(Recorder::default());
    let config = ApiConfig::new(&format!("http://{addr}")).with_timeout(Duration::from_millis(200));
    let api = ApiClient::new(config).with_notifier(recorder.clone());

    let err = api.tasks().get_task("alice", "task1").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    let source = std::error::Error::source(&err)
        .and_then(|s| s.downcast_ref::<reqwest::Error>())
        .expect("reqwest error source");
    assert!(source.is_timeout());

    let messages = recorder.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], err.notification_text());
    drop(silent);
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let (api, recorder) = client(&format!("http://{addr}"));

    let err = api.records().get_record("alice", "rec1").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(recorder.messages().len(), 1);
}
