//! Registration behavior over real manifest trees.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{get, status_and_body, Fixture};

use autoroute::report::RouteStatus;

#[tokio::test]
async fn test_valid_candidates_register_and_invalid_ones_are_reported() {
    let fx = Fixture::new();
    fx.route("main/main.toml", "Main", "GET", "/", "main")
        .route("api/items.toml", "Items", "GET", "/items/:id", "echo")
        .manifest(
            "api/create.json",
            r#"{ "Name": "Create", "Route": "/items", "Method": "post", "handle": "direct" }"#,
        )
        // Missing method and handler
        .manifest("broken/shape.toml", "name = \"Shape\"\nroute = \"/shape\"\n")
        // Unknown handler
        .route("broken/unknown.toml", "Unknown", "GET", "/unknown", "nope")
        // Not parseable
        .manifest("broken/syntax.toml", "name = \n");

    let registered = fx.register();
    let report = &registered.report;

    assert_eq!(registered.table.len(), 3);
    assert_eq!(report.len(), 6);
    assert_eq!(report.active_routes(), 3);

    let failed: Vec<&str> = report.failed().map(|r| r.name.as_str()).collect();
    assert_eq!(failed, vec!["broken/shape.toml", "broken/syntax.toml", "broken/unknown.toml"]);
    for row in report.failed() {
        assert_eq!(row.method, "");
        assert_eq!(row.route, "");
        assert!(row.reason.is_some());
    }

    let rendered = report.render();
    assert!(rendered.contains("│ Items"));
    assert!(rendered.contains("✗"));
}

#[tokio::test]
async fn test_duplicate_route_keeps_the_first() {
    let fx = Fixture::new();
    fx.route("a.toml", "First", "GET", "/x", "echo")
        .route("b.toml", "Second", "GET", "/x", "direct")
        .route("c.toml", "OtherMethod", "POST", "/x", "direct");

    let registered = fx.register();
    assert_eq!(registered.table.count(&Method::GET, "/x"), 1);
    assert_eq!(registered.table.count(&Method::POST, "/x"), 1);

    let rows = registered.report.rows();
    assert_eq!(rows[0].status, RouteStatus::Ok);
    assert_eq!(rows[1].name, "b.toml");
    assert_eq!(rows[1].status, RouteStatus::Failed);
    assert!(rows[1].reason.as_deref().unwrap().starts_with("duplicate_route"));

    // The first registration is the one serving.
    let app = fx.app();
    let (status, body) = status_and_body(get(&app, "/x").await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"route\":\"/x\""), "{body}");
}

#[tokio::test]
async fn test_equivalent_patterns_are_duplicates() {
    let fx = Fixture::new();
    fx.route("a.toml", "Colon", "GET", "/users/:id", "echo")
        .route("b.toml", "Braces", "GET", "/users/{user}", "echo");

    let registered = fx.register();
    assert_eq!(registered.table.len(), 1);
    assert_eq!(registered.report.failed().count(), 1);
}

#[tokio::test]
async fn test_unchanged_tree_gives_identical_reports() {
    let fx = Fixture::new();
    fx.route("main.toml", "Main", "GET", "/", "main")
        .route("nested/deeper/echo.toml", "Echo", "GET", "/echo", "echo")
        .manifest("nested/bad.toml", "route = \"/bad\"\n");

    let first = fx.register().report;
    let second = fx.register().report;
    assert_eq!(first, second);
    assert_eq!(first.render(), second.render());
}

#[tokio::test]
async fn test_routes_naming_one_store_share_a_handle() {
    let fx = Fixture::new();
    fx.manifest(
        "a.toml",
        "name = \"A\"\nroute = \"/a\"\nmethod = \"GET\"\nstorage_file = \"users.store\"\nhandler = \"store_name\"\n",
    )
    .manifest(
        "b.toml",
        "name = \"B\"\nroute = \"/b\"\nmethod = \"GET\"\nSqlite = \"users.store\"\nhandler = \"store_name\"\n",
    )
    .manifest(
        "c.toml",
        "name = \"C\"\nroute = \"/c\"\nmethod = \"GET\"\nstorage_file = \"other.store\"\nhandler = \"store_name\"\n",
    );

    let registered = fx.register();
    assert_eq!(registered.binder.len(), 2);

    let stores: Vec<_> = registered
        .table
        .routes()
        .map(|r| r.store().cloned().unwrap())
        .collect();
    assert!(Arc::ptr_eq(&stores[0], &stores[1]));
    assert!(!Arc::ptr_eq(&stores[0], &stores[2]));

    // Handlers see the same handle at request time.
    let app = fx.app();
    let (_, a) = status_and_body(get(&app, "/a").await).await;
    let (_, b) = status_and_body(get(&app, "/b").await).await;
    let a: serde_json::Value = serde_json::from_str(&a).unwrap();
    let b: serde_json::Value = serde_json::from_str(&b).unwrap();
    assert_eq!(a["store"], "users.store");
    assert_eq!(a["addr"], b["addr"]);
}

#[tokio::test]
async fn test_unusable_store_fails_only_its_route() {
    let fx = Fixture::new();
    fx.manifest(
        "escape.toml",
        "name = \"Escape\"\nroute = \"/escape\"\nmethod = \"GET\"\nstorage_file = \"../outside.store\"\nhandler = \"store_name\"\n",
    )
    .route("fine.toml", "Fine", "GET", "/fine", "echo");

    let registered = fx.register();
    assert_eq!(registered.table.len(), 1);
    assert_eq!(registered.table.count(&Method::GET, "/fine"), 1);

    let failed: Vec<_> = registered.report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name, "escape.toml");
    assert!(failed[0].reason.as_deref().unwrap().starts_with("resource"));
}

#[tokio::test]
async fn test_missing_routes_dir_registers_nothing() {
    let fx = Fixture::new();
    std::fs::remove_dir_all(&fx.config.discovery.routes_dir).unwrap();

    let registered = fx.register();
    assert!(registered.table.is_empty());
}
