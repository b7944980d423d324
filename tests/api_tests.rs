//! End-to-end HTTP tests against the in-memory store.
//!
//! Each test boots the full router on an ephemeral port and drives it with
//! `reqwest`, minting bearer tokens with the same codec the server uses.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use slot_swapper::api;
use slot_swapper::app_state::AppState;
use slot_swapper::auth::{Authenticator, TokenCodec};
use slot_swapper::domain::{CallerIdentity, UserId};
use slot_swapper::persistence::MemoryStore;

const SECRET: &str = "integration-secret-integration-secret";

struct TestApp {
    addr: SocketAddr,
    codec: TokenCodec,
    client: reqwest::Client,
}

struct User {
    identity: CallerIdentity,
    token: String,
}

impl TestApp {
    async fn spawn() -> Self {
        let codec = TokenCodec::new(SECRET, 3600);
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Authenticator::new(codec.clone()),
        );
        let app = api::build_router().with_state(state);

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self {
            addr,
            codec,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    fn user(&self, name: &str) -> User {
        let identity = CallerIdentity::new(UserId::new(), name);
        let Ok(token) = self.codec.issue(&identity) else {
            panic!("token issue failed");
        };
        User { identity, token }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(user) = user {
            req = req.bearer_auth(&user.token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let Ok(resp) = req.send().await else {
            panic!("request to {path} failed");
        };
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn create_event(&self, user: &User, title: &str, status: &str) -> String {
        let (code, body) = self
            .send(
                reqwest::Method::POST,
                "/api/v1/events",
                Some(user),
                Some(json!({
                    "title": title,
                    "start": "2024-01-01T09:00",
                    "end": "2024-01-01T17:00",
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
        let Some(id) = body["id"].as_str() else {
            panic!("no id in {body}");
        };
        id.to_string()
    }

    async fn create_swap(&self, user: &User, target: &str, offer: &str) -> (StatusCode, Value) {
        self.send(
            reqwest::Method::POST,
            "/api/v1/requests",
            Some(user),
            Some(json!({ "target_event_id": target, "offer_event_id": offer })),
        )
        .await
    }
}

fn request_id(body: &Value) -> String {
    let Some(id) = body["id"].as_str() else {
        panic!("no id in {body}");
    };
    id.to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::spawn().await;
    let (code, body) = app.send(reqwest::Method::GET, "/health", None, None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn shift_swap_end_to_end() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    let shift1 = app.create_event(&alice, "Shift1", "Swappable").await;
    let shift2 = app.create_event(&bob, "Shift2", "Swappable").await;

    let (code, request) = app.create_swap(&bob, &shift1, &shift2).await;
    assert_eq!(code, StatusCode::CREATED, "{request}");
    assert_eq!(request["status"], "pending");
    assert_eq!(request["responder_id"], json!(alice.identity.user_id));
    let id = request_id(&request);

    let (code, incoming) = app
        .send(reqwest::Method::GET, "/api/v1/requests/incoming", Some(&alice), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(incoming.as_array().map(Vec::len), Some(1));

    let accept = format!("/api/v1/requests/{id}/accept");
    let (code, settled) = app
        .send(reqwest::Method::PATCH, &accept, Some(&alice), None)
        .await;
    assert_eq!(code, StatusCode::OK, "{settled}");
    assert_eq!(settled["request"]["status"], "accepted");
    assert_eq!(settled["requested_event"]["id"], json!(shift1));
    assert_eq!(settled["requested_event"]["owner_id"], json!(bob.identity.user_id));
    assert_eq!(settled["requested_event"]["owner_name"], "bob");
    assert_eq!(settled["offered_event"]["owner_id"], json!(alice.identity.user_id));
    assert_eq!(settled["offered_event"]["status"], "Busy");
    assert_eq!(settled["requested_event"]["status"], "Busy");

    let (code, mine) = app
        .send(reqwest::Method::GET, "/api/v1/events/mine", Some(&bob), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(mine[0]["title"], "Shift1");

    let (code, again) = app
        .send(reqwest::Method::PATCH, &accept, Some(&alice), None)
        .await;
    assert_eq!(code, StatusCode::CONFLICT, "{again}");
}

#[tokio::test]
async fn requester_cannot_accept_own_request() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    let shift1 = app.create_event(&alice, "Shift1", "Swappable").await;
    let shift2 = app.create_event(&bob, "Shift2", "Swappable").await;
    let (_, request) = app.create_swap(&bob, &shift1, &shift2).await;
    let id = request_id(&request);

    let (code, body) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/api/v1/requests/{id}/accept"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 1201);

    let (_, mine) = app
        .send(reqwest::Method::GET, "/api/v1/events/mine", Some(&alice), None)
        .await;
    assert_eq!(mine[0]["id"], json!(shift1));
    assert_eq!(mine[0]["status"], "Swappable");
}

#[tokio::test]
async fn marketplace_is_browsable_anonymously() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    app.create_event(&alice, "Open A", "Swappable").await;
    app.create_event(&bob, "Open B", "Swappable").await;
    app.create_event(&bob, "Closed", "Busy").await;

    let (code, all) = app
        .send(reqwest::Method::GET, "/api/v1/events/marketplace", None, None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let (_, for_bob) = app
        .send(reqwest::Method::GET, "/api/v1/events/marketplace", Some(&bob), None)
        .await;
    assert_eq!(for_bob.as_array().map(Vec::len), Some(1));
    assert_eq!(for_bob[0]["title"], "Open A");

    let Ok(resp) = app
        .client
        .get(app.url("/api/v1/events/marketplace"))
        .bearer_auth("not-a-token")
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_fail_closed() {
    let app = TestApp::spawn().await;
    let (code, body) = app
        .send(reqwest::Method::GET, "/api/v1/events/mine", None, None)
        .await;
    assert_eq!(code, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1101);

    let foreign = TokenCodec::new("some-other-secret-some-other-secret", 3600);
    let Ok(token) = foreign.issue(&CallerIdentity::new(UserId::new(), "eve")) else {
        panic!("issue failed");
    };
    let Ok(resp) = app
        .client
        .get(app.url("/api/v1/auth/validate"))
        .bearer_auth(token)
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_returns_identity() {
    let app = TestApp::spawn().await;
    let carol = app.user("carol");
    let (code, body) = app
        .send(reqwest::Method::GET, "/api/v1/auth/validate", Some(&carol), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["name"], "carol");
    assert_eq!(body["user"]["user_id"], json!(carol.identity.user_id));
}

#[tokio::test]
async fn event_validation_and_ownership() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");

    let (code, body) = app
        .send(
            reqwest::Method::POST,
            "/api/v1/events",
            Some(&alice),
            Some(json!({ "title": "  ", "start": "2024-01-01T09:00", "end": "2024-01-01T10:00" })),
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);

    let id = app.create_event(&alice, "Shift", "Busy").await;
    let path = format!("/api/v1/events/{id}");

    let (code, body) = app
        .send(
            reqwest::Method::PATCH,
            &path,
            Some(&alice),
            Some(json!({ "status": "Maybe" })),
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);

    let (code, _) = app
        .send(
            reqwest::Method::PATCH,
            &path,
            Some(&bob),
            Some(json!({ "status": "Swappable" })),
        )
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let (code, _) = app
        .send(reqwest::Method::DELETE, &path, Some(&bob), None)
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let (code, body) = app
        .send(reqwest::Method::DELETE, &path, Some(&alice), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["message"], "event deleted");

    let (code, _) = app
        .send(reqwest::Method::DELETE, &path, Some(&alice), None)
        .await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reject_and_delete_request() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    let carol = app.user("carol");
    let shift1 = app.create_event(&alice, "Shift1", "Swappable").await;
    let shift2 = app.create_event(&bob, "Shift2", "Busy").await;
    let (_, request) = app.create_swap(&bob, &shift1, &shift2).await;
    let id = request_id(&request);

    let (code, _) = app
        .send(
            reqwest::Method::DELETE,
            &format!("/api/v1/events/{shift1}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::CONFLICT);

    let (code, body) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/api/v1/requests/{id}/reject"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["request"]["status"], "rejected");

    let path = format!("/api/v1/requests/{id}");
    let (code, _) = app
        .send(reqwest::Method::DELETE, &path, Some(&carol), None)
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let (code, _) = app
        .send(reqwest::Method::DELETE, &path, Some(&bob), None)
        .await;
    assert_eq!(code, StatusCode::OK);

    let (_, outgoing) = app
        .send(reqwest::Method::GET, "/api/v1/requests/outgoing", Some(&bob), None)
        .await;
    assert_eq!(outgoing.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn malformed_input_uses_error_shape() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let shift1 = app.create_event(&alice, "Shift1", "Busy").await;

    let (code, body) = app.create_swap(&alice, "not-a-uuid", "not-a-uuid").await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001, "{body}");

    let (code, body) = app
        .send(
            reqwest::Method::PATCH,
            "/api/v1/events/not-a-uuid",
            Some(&alice),
            Some(json!({ "status": "Swappable" })),
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001, "{body}");

    let Ok(resp) = app
        .client
        .patch(app.url(&format!("/api/v1/events/{shift1}")))
        .bearer_auth(&alice.token)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"status\":")
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    assert_eq!(body["error"]["code"], 1001, "{body}");

    let (code, body) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/api/v1/requests/{shift1}x/accept"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001, "{body}");
}

#[tokio::test]
async fn rejected_request_cannot_be_accepted() {
    let app = TestApp::spawn().await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    let shift1 = app.create_event(&alice, "Shift1", "Swappable").await;
    let shift2 = app.create_event(&bob, "Shift2", "Busy").await;
    let (_, request) = app.create_swap(&bob, &shift1, &shift2).await;
    let id = request_id(&request);

    let (code, _) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/api/v1/requests/{id}/reject"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::OK);

    let (code, _) = app
        .send(
            reqwest::Method::PATCH,
            &format!("/api/v1/requests/{id}/accept"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(code, StatusCode::CONFLICT);

    let (_, mine) = app
        .send(reqwest::Method::GET, "/api/v1/events/mine", Some(&alice), None)
        .await;
    let titles: Vec<&str> = mine
        .as_array()
        .map(|events| events.iter().filter_map(|e| e["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, ["Shift1"]);
}
