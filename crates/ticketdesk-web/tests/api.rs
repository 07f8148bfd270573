use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use ticketdesk_core::{
    user::{self, model::{NewUser, Role}},
    DeskConfig, EventKind, EventPublisher, TicketEvent,
};
use ticketdesk_store::MemoryStore;
use ticketdesk_web::{create_router, AppState};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<TicketEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: TicketEvent) {
        self.events.lock().push(event);
    }
}

struct TestApp {
    router: Router,
    events: Arc<RecordingPublisher>,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        user::create_user(
            &*store,
            NewUser {
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
                student_id: "admin".to_string(),
                password: "admin123".to_string(),
                email: None,
                course: None,
                role: Role::Admin,
            },
        )
        .await
        .unwrap();

        let events = Arc::new(RecordingPublisher::default());
        let state = AppState::new(store, &DeskConfig::default()).with_publisher(events.clone());
        Self {
            router: create_router(state),
            events,
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(&self, name: &str, student_id: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({"name": name, "studentId": student_id, "password": "secret1"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"studentId": "admin", "password": "admin123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirectUrl"], "/admin");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_ticket(&self, token: &str, student_id: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/complaints",
                Some(token),
                Some(json!({
                    "studentId": student_id,
                    "complaintType": "facility",
                    "description": "The library air conditioning is broken",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    fn event_kinds(&self) -> Vec<EventKind> {
        self.events.events.lock().iter().map(|e| e.kind).collect()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(Method::GET, "/api/complaints?studentId=123456", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");

    let (status, _) = app
        .request(Method::GET, "/api/complaints?studentId=123456", Some("bogus"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_publishes_created_event() {
    let app = TestApp::new().await;
    let token = app.signup("Grace Hopper", "123456").await;

    let ticket = app.create_ticket(&token, "123456").await;
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["studentId"], "123456");

    let events = app.events.events.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Created);
    assert_eq!(events[0].ticket_id(), ticket["id"].as_str());

    let (status, list) = app
        .request(Method::GET, "/api/complaints?studentId=123456", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_mutation_publishes_nothing() {
    let app = TestApp::new().await;
    let token = app.signup("Grace Hopper", "123456").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/complaints",
            Some(&token),
            Some(json!({"complaintType": "weather", "description": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    assert!(app.event_kinds().is_empty());
}

#[tokio::test]
async fn test_students_only_see_their_own_tickets() {
    let app = TestApp::new().await;
    let alice = app.signup("Alice Liddell", "111111").await;
    let bob = app.signup("Bob Builder", "222222").await;
    let ticket = app.create_ticket(&alice, "111111").await;
    let id = ticket["id"].as_str().unwrap();

    let (status, _) = app
        .request(Method::GET, "/api/complaints?studentId=111111", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/complaints?id={id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::GET, "/api/complaints", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_admin_status_publish_updates() {
    let app = TestApp::new().await;
    let student = app.signup("Grace Hopper", "123456").await;
    let admin = app.admin_token().await;
    let ticket = app.create_ticket(&student, "123456").await;
    let id = ticket["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .request(
            Method::PUT,
            "/api/complaints",
            Some(&student),
            Some(json!({
                "id": id,
                "complaintType": "facility",
                "description": "The library air conditioning is still broken",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "open");

    let (status, resolved) = app
        .request(
            Method::PUT,
            &format!("/api/admin/complaints/{id}"),
            Some(&admin),
            Some(json!({"status": "resolved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");

    // Resolved tickets no longer accept content edits.
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/complaints/{id}"),
            Some(&student),
            Some(json!({"description": "Please look at this again soon"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(
        app.event_kinds(),
        vec![EventKind::Created, EventKind::Updated, EventKind::Updated]
    );
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new().await;
    let student = app.signup("Grace Hopper", "123456").await;
    let admin = app.admin_token().await;
    app.create_ticket(&student, "123456").await;

    let (status, _) = app.request(Method::GET, "/api/admin/complaints", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = app
        .request(Method::GET, "/api/admin/complaints?status=open&q=hopper", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user"]["firstName"], "Grace");

    let (status, _) = app
        .request(Method::GET, "/api/admin/complaints?status=archived", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, users) = app.request(Method::GET, "/api/users?role=student", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_admin_flag_comes_from_session() {
    let app = TestApp::new().await;
    let student = app.signup("Grace Hopper", "123456").await;
    let admin = app.admin_token().await;
    let ticket = app.create_ticket(&student, "123456").await;
    let uri = format!("/api/complaints/{}/comments", ticket["id"].as_str().unwrap());

    let (status, comment) = app
        .request(
            Method::POST,
            &uri,
            Some(&student),
            Some(json!({"content": "Any update?", "isAdminComment": true})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["isAdminComment"], false);

    let (status, comment) = app
        .request(Method::POST, &uri, Some(&admin), Some(json!({"content": "Technician booked"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["isAdminComment"], true);

    let (status, comments) = app.request(Method::GET, &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_login_rate_limit() {
    let app = TestApp::new().await;
    app.signup("Grace Hopper", "123456").await;

    let attempt = json!({"studentId": "123456", "password": "wrong-password"});
    for _ in 0..5 {
        let (status, body) = app
            .request(Method::POST, "/api/auth/login", None, Some(attempt.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Incorrect password");
    }
    let (status, _) = app
        .request(Method::POST, "/api/auth/login", None, Some(attempt))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let token = app.signup("Grace Hopper", "123456").await;

    let (status, _) = app.request(Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::GET, "/api/complaints?studentId=123456", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_socket_endpoint_rejects_plain_requests() {
    let app = TestApp::new().await;
    let (status, _) = app.request(Method::GET, "/api/socketio", None, None).await;
    assert!(status.is_client_error());
}
