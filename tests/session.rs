use expense_tracker::models::Category;
use expense_tracker::views::{ListView, EMPTY_PLACEHOLDER};
use expense_tracker::{router, AppState, ExpenseForm, Session, SyncClient, SyncEvent, Tracker};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;

struct LocalServer {
    base_url: String,
    data_path: PathBuf,
    _dir: tempfile::TempDir,
}

async fn start_server() -> LocalServer {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("expenses.json");
    let app = router(AppState::new(data_path.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    LocalServer {
        base_url: format!("http://{addr}"),
        data_path,
        _dir: dir,
    }
}

fn form(description: &str, amount: &str, category: &str, date: &str) -> ExpenseForm {
    ExpenseForm {
        description: description.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        date: date.to_string(),
    }
}

async fn next_event(events: &mut Receiver<SyncEvent>) -> SyncEvent {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("sync event in time")
        .expect("open channel")
}

#[tokio::test]
async fn fresh_session_starts_empty() {
    let server = start_server().await;
    let session = Session::connect(SyncClient::new(&server.base_url)).await.unwrap();

    assert!(session.tracker().is_empty());
    let page = session.page();
    assert_eq!(
        page.list,
        ListView::Empty {
            placeholder: EMPTY_PLACEHOLDER
        }
    );
    assert_eq!(page.summary.display, "$0.00");
    assert!(page.chart.is_empty());
}

#[tokio::test]
async fn add_and_delete_are_pushed_and_survive_reload() {
    let server = start_server().await;
    let mut session = Session::connect(SyncClient::new(&server.base_url)).await.unwrap();
    let mut events = session.subscribe();

    let lunch = session.add(&form("Lunch", "4.50", "Food", "2024-01-01")).unwrap();
    assert_eq!(
        next_event(&mut events).await,
        SyncEvent::Saved { revision: 1, count: 1 }
    );
    let snack = session.add(&form("Snack", "2.00", "Food", "2024-01-02")).unwrap();
    next_event(&mut events).await;
    session.add(&form("Train", "10.00", "Transport", "2024-03-01")).unwrap();
    next_event(&mut events).await;

    let page = session.page();
    assert_eq!(page.summary.display, "$16.50");
    let groups: Vec<(Category, Decimal)> = page.chart.iter().map(|s| (s.category, s.total)).collect();
    assert_eq!(
        groups,
        vec![
            (Category::Food, Decimal::new(650, 2)),
            (Category::Transport, Decimal::new(1000, 2)),
        ]
    );

    let removed = session.delete(&snack).expect("snack removed");
    assert_eq!(removed.description, "Snack");
    assert_eq!(
        next_event(&mut events).await,
        SyncEvent::Saved { revision: 4, count: 2 }
    );

    let reloaded = Session::connect(SyncClient::new(&server.base_url)).await.unwrap();
    assert_eq!(reloaded.tracker().expenses(), session.tracker().expenses());
    assert!(reloaded.tracker().get(&lunch).is_some());
    assert!(reloaded.tracker().get(&snack).is_none());
    assert!(server.data_path.exists());
}

#[tokio::test]
async fn invalid_form_changes_nothing_and_pushes_nothing() {
    let server = start_server().await;
    let mut session = Session::connect(SyncClient::new(&server.base_url)).await.unwrap();
    let mut events = session.subscribe();

    assert!(session.add(&form("Lunch", "free", "Food", "2024-01-01")).is_err());
    assert!(session.add(&form("", "3", "Food", "2024-01-01")).is_err());

    assert!(session.tracker().is_empty());
    assert_eq!(session.revision(), 0);
    assert!(events.try_recv().is_err());
    assert!(!server.data_path.exists());
}

#[tokio::test]
async fn unreachable_server_reports_failure_and_keeps_local_state() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = Session::new(Tracker::default(), SyncClient::new(format!("http://{addr}")));
    let mut events = session.subscribe();

    let id = session.add(&form("Cinema", "12", "Entertainment", "2024-02-10")).unwrap();
    match next_event(&mut events).await {
        SyncEvent::Failed { revision, message } => {
            assert_eq!(revision, 1);
            assert!(!message.is_empty());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(session.tracker().get(&id).is_some());
}

#[tokio::test]
async fn server_write_failure_surfaces_as_failed_event() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(AppState::new(dir.path().join("missing").join("expenses.json")));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut session = Session::new(Tracker::default(), SyncClient::new(format!("http://{addr}")));
    let mut events = session.subscribe();
    session.add(&form("Rent", "800", "Utilities", "2024-02-01")).unwrap();

    match next_event(&mut events).await {
        SyncEvent::Failed { message, .. } => {
            assert!(message.contains("500"), "{message}");
            assert!(message.contains("Check server permissions"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(session.tracker().len(), 1);
}
