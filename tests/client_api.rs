//! The terminal client's HTTP layer against a live service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use uuid::Uuid;

use taskboard::{
    build_router,
    client::{ApiError, TaskApi},
    JsonTaskStore, TaskDraft, TaskStatus,
};

/// Start the service on a random port.
async fn start_service() -> SocketAddr {
    let app = build_router(Arc::new(JsonTaskStore::in_memory()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    addr
}

fn draft(title: &str, due_date: &str) -> TaskDraft {
    TaskDraft {
        title: Some(title.to_string()),
        due_date: Some(due_date.to_string()),
        ..TaskDraft::default()
    }
}

#[tokio::test]
async fn create_list_update_delete() {
    let addr = start_service().await;
    let api = TaskApi::new(format!("http://{addr}/api/"));

    assert!(api.list().await.unwrap().is_empty());

    let created = api.create(&draft("Buy milk", "2099-01-01")).await.unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.status, TaskStatus::Pending);
    assert_eq!(api.list().await.unwrap(), vec![created.clone()]);

    let updated = api
        .update(
            created.id,
            &TaskDraft {
                status: Some(TaskStatus::Completed),
                ..draft("Buy oat milk", "2099-01-02")
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.status, TaskStatus::Completed);

    let message = api.delete(created.id).await.unwrap();
    assert_eq!(message, "Task deleted successfully.");
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_messages_are_surfaced() {
    let addr = start_service().await;
    let api = TaskApi::new(format!("http://{addr}/api"));

    let err = api.create(&draft("", "2099-01-01")).await.unwrap_err();
    assert!(matches!(&err, ApiError::Server(m) if m == "Title is required."));
    assert_eq!(err.user_message("Error creating task"), "Title is required.");

    let err = api.delete(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.user_message("Error deleting task"), "Task not found.");
}

#[tokio::test]
async fn unreachable_service_uses_fallback_message() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = TaskApi::new(format!("http://{addr}/api"));
    let err = api.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.user_message("Error loading tasks"), "Error loading tasks");
}
