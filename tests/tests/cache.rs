use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tests::{prelude::*, *};

use warden::{schema::CollectionId, Config, ExecuteRequest, RecordQuery};

#[tokio::test]
async fn policies_are_served_from_cache_until_invalidated() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));

    assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );

    fx.add_policy(policy(2, TODOS, "deny", json!(null), "api_key"));

    // Still the cached snapshot.
    assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );

    fx.db
        .invalidate_policies(PROJECT, &CollectionId::from(TODOS))
        .await;

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
}

#[tokio::test]
async fn view_changes_apply_after_invalidation() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({"name": "top", "base_collection_id": TODOS, "default_limit": 1}));

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "top", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!((page.view_version, page.data.len()), (1, 1));

    fx.catalog.update_view(PROJECT, "top", |view| view.default_limit = 3);

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "top", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!((page.view_version, page.data.len()), (1, 1));

    fx.db.invalidate_project(PROJECT).await;

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "top", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!((page.view_version, page.data.len()), (2, 3));
}

#[tokio::test]
async fn missing_view_is_not_cached() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));

    let err = assert_err!(
        fx.db
            .compile_and_execute(PROJECT, "late", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert!(err.is_authorization_denied());

    fx.put_view(json!({"name": "late", "base_collection_id": TODOS}));

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "late", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn disabled_cache_reads_through() {
    let fx = Fixture::with_config(Config {
        cache_ttl: Duration::ZERO,
        ..Config::default()
    })
    .await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));

    assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );

    assert!(fx.catalog.remove_policy(PROJECT, 1));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
}
