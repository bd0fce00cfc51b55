//! Common test utilities for directory integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use forum_core::Catalog;
use forum_directory::{
    routes, AppState, HierarchySettings, InMemoryContactStore, InMemoryHierarchyStore,
    InMemoryUserStore, USER_HEADER,
};
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "head@forum.ac.il";

/// Create a test server over in-memory stores with the built-in catalog
pub fn create_test_server() -> TestServer {
    create_test_server_with(HierarchySettings::default())
}

pub fn create_test_server_with(settings: HierarchySettings) -> TestServer {
    let state = Arc::new(AppState::new(
        Catalog::builtin().expect("built-in catalog"),
        settings,
        &[ADMIN_EMAIL.to_string()],
        Arc::new(InMemoryHierarchyStore::new()),
        Arc::new(InMemoryContactStore::new()),
        Arc::new(InMemoryUserStore::new()),
    ));

    let app = routes::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Header identifying `uid` as the acting user
pub fn as_user(uid: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(USER_HEADER),
        HeaderValue::from_str(uid).expect("valid header value"),
    )
}

pub async fn sign_in(server: &TestServer, uid: &str, email: &str) -> Value {
    let (name, value) = as_user(uid);
    let response = server
        .post("/api/session")
        .add_header(name, value)
        .json(&json!({ "email": email }))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json::<Value>()
}

/// Sign in the admin account as `uid` and create the organization
pub async fn bootstrap_head(server: &TestServer, uid: &str) {
    sign_in(server, uid, ADMIN_EMAIL).await;

    let (name, value) = as_user(uid);
    let response = server
        .post("/api/organization/initialize")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Create a contact record with a fixed id on behalf of `actor`
pub async fn create_contact(server: &TestServer, actor: &str, id: &str, name: &str) {
    let (header, value) = as_user(actor);
    let response = server
        .post("/api/contacts")
        .add_header(header, value)
        .json(&json!({
            "id": id,
            "name": name,
            "email": format!("{id}@student.ac.il"),
            "track": "Computer Science",
            "year": 2,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
}

pub async fn assign_coordinator(server: &TestServer, actor: &str, user: &str, school_id: &str) {
    let (header, value) = as_user(actor);
    let response = server
        .post("/api/coordinators")
        .add_header(header, value)
        .json(&json!({ "userId": user, "schoolId": school_id }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Place `user` as a rep and return the response status
pub async fn add_rep(
    server: &TestServer,
    actor: &str,
    user: &str,
    school_id: &str,
    track_id: &str,
    year: u8,
) -> u16 {
    let (header, value) = as_user(actor);
    server
        .post("/api/reps")
        .add_header(header, value)
        .json(&json!({
            "userId": user,
            "schoolId": school_id,
            "trackId": track_id,
            "year": year,
        }))
        .await
        .status_code()
        .as_u16()
}

pub async fn get_as(server: &TestServer, uid: &str, path: &str) -> (u16, Value) {
    let (header, value) = as_user(uid);
    let response = server.get(path).add_header(header, value).await;
    let status = response.status_code().as_u16();
    let body = if response.text().is_empty() {
        Value::Null
    } else {
        response.json::<Value>()
    };
    (status, body)
}
