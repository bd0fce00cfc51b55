//! Contact directory endpoints

mod common;

use common::{
    add_rep, as_user, assign_coordinator, bootstrap_head, create_contact, create_test_server,
    get_as,
};
use serde_json::{json, Value};

fn ids(contacts: &Value) -> Vec<String> {
    contacts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

/// Test: listing is sorted by name and filterable
#[tokio::test]
async fn test_list_and_filter() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    create_contact(&server, "u1", "c1", "zohar").await;
    create_contact(&server, "u1", "c2", "Avi").await;
    create_contact(&server, "u1", "c3", "Noa").await;
    assert_eq!(add_rep(&server, "u1", "c3", "cs", "cs-track-0", 1).await, 200);

    let (status, all) = get_as(&server, "u1", "/api/contacts").await;
    assert_eq!(status, 200);
    // The head's own record was created by bootstrap
    assert_eq!(ids(&all), vec!["c2", "u1", "c3", "c1"]);

    let (_, reps) = get_as(&server, "u1", "/api/contacts?roleType=rep").await;
    assert_eq!(ids(&reps), vec!["c3"]);

    let (_, found) = get_as(&server, "u1", "/api/contacts?search=ZOH").await;
    assert_eq!(ids(&found), vec!["c1"]);

    let (_, placed) = get_as(&server, "u1", "/api/contacts?schoolId=cs&trackId=cs-track-0").await;
    assert_eq!(ids(&placed), vec!["c3"]);
}

/// Test: only managers create contacts, and a name is required
#[tokio::test]
async fn test_create_contact_rules() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;

    let (header, value) = as_user("u7");
    let response = server
        .post("/api/contacts")
        .add_header(header, value)
        .json(&json!({ "name": "Someone" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let (header, value) = as_user("u1");
    let response = server
        .post("/api/contacts")
        .add_header(header, value)
        .json(&json!({ "name": "   " }))
        .await;
    assert_eq!(response.status_code(), 400);

    let (header, value) = as_user("u1");
    let response = server
        .post("/api/contacts")
        .add_header(header, value)
        .json(&json!({ "name": "Generated", "year": 3 }))
        .await;
    assert_eq!(response.status_code(), 200);
    let contact = response.json::<Value>();
    assert!(!contact["id"].as_str().unwrap().is_empty());
    assert_eq!(contact["year"], 3);
}

/// Test: duplicate contact ids are rejected
#[tokio::test]
async fn test_duplicate_contact_id() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    create_contact(&server, "u1", "c1", "Avi").await;

    let (header, value) = as_user("u1");
    let response = server
        .post("/api/contacts")
        .add_header(header, value)
        .json(&json!({ "id": "c1", "name": "Avi again" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: users edit their own record, managers edit anyone's
#[tokio::test]
async fn test_update_contact() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    create_contact(&server, "u1", "c1", "Avi").await;
    create_contact(&server, "u1", "c2", "Noa").await;

    let (header, value) = as_user("c1");
    let response = server
        .patch("/api/contacts/c1")
        .add_header(header, value)
        .json(&json!({ "phone": "050-1234567" }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["phone"], "050-1234567");

    let (header, value) = as_user("c1");
    let response = server
        .patch("/api/contacts/c2")
        .add_header(header, value)
        .json(&json!({ "name": "Hijacked" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let (header, value) = as_user("u1");
    let response = server
        .patch("/api/contacts/c2")
        .add_header(header, value)
        .json(&json!({ "name": "Noa Cohen" }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["name"], "Noa Cohen");

    let (header, value) = as_user("u1");
    let response = server
        .patch("/api/contacts/nobody")
        .add_header(header, value)
        .json(&json!({ "name": "x" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Test: only the head deletes contacts
#[tokio::test]
async fn test_delete_contact() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    create_contact(&server, "u1", "u2", "Dana Levi").await;
    assign_coordinator(&server, "u1", "u2", "cs").await;
    create_contact(&server, "u1", "c1", "Avi").await;

    let (header, value) = as_user("u2");
    let response = server.delete("/api/contacts/c1").add_header(header, value).await;
    assert_eq!(response.status_code(), 403);

    let (header, value) = as_user("u1");
    let response = server.delete("/api/contacts/c1").add_header(header, value).await;
    assert_eq!(response.status_code(), 200);

    let (status, _) = get_as(&server, "u1", "/api/contacts/c1").await;
    assert_eq!(status, 404);
}

/// Test: a coordinator creates a rep who has no account
#[tokio::test]
async fn test_create_rep_contact() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    create_contact(&server, "u1", "u2", "Dana Levi").await;
    assign_coordinator(&server, "u1", "u2", "cs").await;

    let (header, value) = as_user("u2");
    let response = server
        .post("/api/contacts/reps")
        .add_header(header, value)
        .json(&json!({
            "contact": { "name": "Yael", "track": "Data Science", "year": 2 },
            "placement": { "schoolId": "cs", "trackId": "cs-track-1", "year": 2, "hasBeenElected": true },
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let contact = response.json::<Value>();
    let id = contact["id"].as_str().unwrap().to_string();
    assert_eq!(contact["roles"][0]["type"], "rep");
    assert_eq!(contact["roles"][0]["hasBeenElected"], true);
    assert_eq!(contact["roles"][0]["coordinatorInCharge"], "u2");

    let (_, roster) = get_as(&server, "u2", "/api/me/reps").await;
    assert_eq!(roster["tracks"][1]["years"][1]["reps"][0]["id"], id.as_str());

    // Another school is off limits
    let (header, value) = as_user("u2");
    let response = server
        .post("/api/contacts/reps")
        .add_header(header, value)
        .json(&json!({
            "contact": { "name": "Omer" },
            "placement": { "schoolId": "law", "trackId": "law-track-0", "year": 1 },
        }))
        .await;
    assert_eq!(response.status_code(), 403);
}

/// Test: a full bucket refuses a new rep contact and creates nothing
#[tokio::test]
async fn test_create_rep_contact_full_bucket() {
    let server = create_test_server();
    bootstrap_head(&server, "u1").await;
    for id in ["c1", "c2"] {
        create_contact(&server, "u1", id, id).await;
        assert_eq!(add_rep(&server, "u1", id, "law", "law-track-2", 3).await, 200);
    }

    let (header, value) = as_user("u1");
    let response = server
        .post("/api/contacts/reps")
        .add_header(header, value)
        .json(&json!({
            "contact": { "id": "c3", "name": "Late" },
            "placement": { "schoolId": "law", "trackId": "law-track-2", "year": 3 },
        }))
        .await;
    assert_eq!(response.status_code(), 409);

    let (status, _) = get_as(&server, "u1", "/api/contacts/c3").await;
    assert_eq!(status, 404);
}
