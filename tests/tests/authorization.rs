use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{prelude::*, *};

use warden::{
    condition::{Condition, Operand},
    policy::Action,
    stmt::Value,
    Page, Principal, RecordQuery,
};

fn ids(page: &Page) -> Vec<i64> {
    page.rows
        .iter()
        .map(|row| assert_some!(row["id"].as_i64()))
        .collect()
}

#[tokio::test]
async fn app_user_sees_only_own_rows() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!({"type": "app_user_owner"}), "app_user"));

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &app_user("U1"), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [1, 3, 4]);
    assert_eq!(page.total, 3);

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &app_user("U2"), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [2]);
}

#[tokio::test]
async fn api_key_only_collection() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, MEMBERS, "allow", json!(null), "api_key"));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "members", &app_user("U1"), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
    assert!(fx.log.is_empty());

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "members", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn unconditional_deny_wins_without_touching_the_store() {
    let fx = Fixture::new().await;

    let mut allow = policy(1, TODOS, "allow", json!(null), "api_key");
    allow.priority = 100;
    fx.add_policy(allow);
    fx.add_policy(policy(2, TODOS, "deny", json!(null), "api_key"));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
    assert!(fx.log.is_empty());
}

#[tokio::test]
async fn conditional_deny_removes_matching_rows() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.add_policy(policy(
        2,
        TODOS,
        "deny",
        json!({"field": "status", "operator": "eq", "value": "done"}),
        "api_key",
    ));

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [1, 2, 4, 5]);
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn deny_on_owner_keeps_unowned_rows() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "app_user"));
    fx.add_policy(policy(
        2,
        TODOS,
        "deny",
        json!({"field": "created_by_app_user_id", "operator": "eq", "value": "U2"}),
        "app_user",
    ));

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &app_user("U1"), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [1, 3, 4, 5]);
    assert_eq!(page.total, 4);
    assert!(fx.log.sql_contains("IS NOT TRUE"));
}

#[tokio::test]
async fn broken_allow_does_not_leak_schema_details() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(
        1,
        TODOS,
        "allow",
        json!({"field": "dropped_column", "operator": "eq", "value": "x"}),
        "api_key",
    ));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
    assert_eq!(err.to_string(), "authorization denied");
    assert!(fx.log.is_empty());

    // A healthy allow next to the broken one still applies.
    fx.add_policy(policy(2, TODOS, "allow", json!({"field": "status", "value": "open", "op": "eq"}), "api_key"));
    fx.db.invalidate_project(PROJECT).await;

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [1, 2, 5]);
}

#[tokio::test]
async fn broken_deny_denies_the_request() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.add_policy(policy(
        2,
        TODOS,
        "deny",
        json!({"field": "dropped_column", "operator": "eq", "value": "x"}),
        "api_key",
    ));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
    assert_eq!(err.to_string(), "authorization denied");
    assert!(fx.log.is_empty());
}

#[tokio::test]
async fn or_condition_widens_a_single_policy() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(
        1,
        TODOS,
        "allow",
        json!({"type": "or", "conditions": [
            {"type": "app_user_owner"},
            {"type": "field_equals", "field": "status", "value": "blocked"}
        ]}),
        "app_user",
    ));

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &app_user("U2"), &RecordQuery::default())
            .await
    );
    assert_eq!(ids(&page), [2, 4]);
}

#[tokio::test]
async fn row_filter_cannot_be_widened_by_client_filter() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!({"type": "app_user_owner"}), "app_user"));

    let query = RecordQuery {
        filter: Condition::default().and("created_by_app_user_id", "eq", Operand::literal("U2")),
        ..RecordQuery::default()
    };

    let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &app_user("U1"), &query).await);
    assert_empty!(page.rows);
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn anonymous_is_denied_by_default() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), ""));

    let err = assert_err!(
        fx.db
            .list_records(PROJECT, "todos", &Principal::Anonymous, &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &Principal::admin_user("admin_1"), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn owner_policy_matches_admin_creator() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!({"type": "owner"}), "admin_user"));

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &Principal::admin_user("admin_1"), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 5);

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &Principal::admin_user("admin_2"), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn unknown_and_unauthorized_collections_look_the_same() {
    let fx = Fixture::new().await;

    for collection in ["todos", "no_such_collection"] {
        let err = assert_err!(
            fx.db
                .list_records(PROJECT, collection, &api_key(), &RecordQuery::default())
                .await
        );
        assert!(err.is_authorization_denied());
        assert_eq!(err.to_string(), "authorization denied");
    }

    let err = assert_err!(
        fx.db
            .list_records("other_project", "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert!(err.is_authorization_denied());
}

#[tokio::test]
async fn authorize_reports_the_row_filter() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!({"type": "app_user_owner"}), "app_user"));

    let auth = assert_ok!(fx.db.authorize(PROJECT, "todos", Action::List, &app_user("U1")).await);
    assert_eq!(auth.applied, [1]);
    assert!(auth
        .row_filter
        .matches(&[("created_by_app_user_id", Value::from("U1"))]));
    assert!(!auth
        .row_filter
        .matches(&[("created_by_app_user_id", Value::from("U2"))]));

    // Policies are per action.
    let err = assert_err!(fx.db.authorize(PROJECT, "todos", Action::Delete, &app_user("U1")).await);
    assert!(err.is_authorization_denied());
}
