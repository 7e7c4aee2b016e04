//! HTTP gateway tests against a mocked server.

use serde_json::json;
use taskboard::board::{NewTask, Priority, Status, Task, TaskPatch};
use taskboard::client::{BoardGateway, HttpGateway};
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_task(epic_id: Uuid) -> Task {
    Task::new(
        epic_id,
        "Fix bug".to_string(),
        None,
        Status::Todo,
        Priority::Medium,
        0,
    )
}

#[tokio::test]
async fn test_list_tasks_parses_records() {
    let server = MockServer::start().await;
    let task = sample_task(Uuid::new_v4());
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![task.clone()]))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let tasks = gateway.list_tasks().await.unwrap();
    assert_eq!(tasks, vec![task]);
}

#[tokio::test]
async fn test_create_task_round_trip() {
    let server = MockServer::start().await;
    let epic_id = Uuid::new_v4();
    let created = sample_task(epic_id);
    let new = NewTask {
        title: "Fix bug".into(),
        description: None,
        status: Status::Todo,
        priority: Priority::Medium,
        epic_id,
    };
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(&new))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let task = gateway.create_task(new).await.unwrap();
    assert_eq!(task, created);
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "title is required" })),
        )
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let err = gateway
        .create_task(NewTask {
            title: "".into(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            epic_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("400"), "got: {message}");
    assert!(message.contains("title is required"), "got: {message}");
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let err = gateway.list_tasks().await.unwrap_err();
    assert!(err.to_string().contains("500"), "got: {err}");
}

#[tokio::test]
async fn test_update_task_sends_partial_patch() {
    let server = MockServer::start().await;
    let mut task = sample_task(Uuid::new_v4());
    task.status = Status::Done;
    Mock::given(method("PUT"))
        .and(path(format!("/api/tasks/{}", task.id)))
        .and(body_json(json!({ "status": "done" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&task))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let updated = gateway
        .update_task(task.id, TaskPatch::status(Status::Done))
        .await
        .unwrap();
    assert_eq!(updated.status, Status::Done);
}

#[tokio::test]
async fn test_delete_task_accepts_empty_204() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{id}")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    gateway.delete_task(id).await.unwrap();
}

#[tokio::test]
async fn test_bulk_create_returns_count() {
    let server = MockServer::start().await;
    let epic_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/tasks/bulk/epic/{epic_id}")))
        .and(body_json(json!({ "bulk_text": "A\nB - High" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "count": 2 })))
        .mount(&server)
        .await;

    let gateway = HttpGateway::new(&server.uri()).unwrap();
    let count = gateway.create_tasks_bulk(epic_id, "A\nB - High").await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let gateway = HttpGateway::new(&base).unwrap();
    assert!(gateway.list_projects().await.unwrap().is_empty());
}
