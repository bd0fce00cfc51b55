//! Directory state survives a restart on the SQLite store

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{add_rep, assign_coordinator, bootstrap_head, create_contact, get_as, ADMIN_EMAIL};
use forum_core::Catalog;
use forum_directory::{routes, AppState, HierarchySettings, SqliteStore};
use tempfile::TempDir;

fn sqlite_server(path: &str) -> TestServer {
    let store = Arc::new(SqliteStore::open(path).unwrap());
    let state = Arc::new(AppState::new(
        Catalog::builtin().unwrap(),
        HierarchySettings::default(),
        &[ADMIN_EMAIL.to_string()],
        Arc::clone(&store),
        Arc::clone(&store),
        store,
    ));
    TestServer::new(routes::create_router(state)).unwrap()
}

#[tokio::test]
async fn test_hierarchy_persists_across_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forum.db");
    let path = path.to_str().unwrap();

    {
        let server = sqlite_server(path);
        bootstrap_head(&server, "u1").await;
        create_contact(&server, "u1", "u2", "Dana Levi").await;
        assign_coordinator(&server, "u1", "u2", "government").await;
        create_contact(&server, "u2", "u3", "Noa").await;
        assert_eq!(
            add_rep(&server, "u2", "u3", "government", "government-track-1", 2).await,
            200
        );
    }

    let server = sqlite_server(path);

    let (_, role) = get_as(&server, "u2", "/api/me/role").await;
    assert_eq!(role["role"], "coordinator");
    assert_eq!(role["schoolId"], "government");

    let (_, roster) = get_as(&server, "u2", "/api/me/reps").await;
    assert_eq!(roster["tracks"][1]["years"][1]["reps"][0]["name"], "Noa");

    let (_, structure) = get_as(&server, "u1", "/api/organization").await;
    assert_eq!(structure["headOfForum"], "u1");
}
