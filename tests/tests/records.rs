use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{prelude::*, *};

use warden::{
    condition::{Condition, Operand},
    stmt::Value,
    Page, RecordQuery, SortField,
};

async fn fixture() -> Fixture {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx
}

fn ids(page: &Page) -> Vec<i64> {
    page.rows
        .iter()
        .map(|row| assert_some!(row["id"].as_i64()))
        .collect()
}

#[tokio::test]
async fn rows_are_keyed_by_field_and_typed() {
    let fx = fixture().await;

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 5);
    assert_eq!(page.limit, 100);

    let row = &page.rows[2];
    assert_eq!(row["id"], Value::I64(3));
    assert_eq!(row["title"], Value::from("Fix bike"));
    assert_eq!(row["done"], Value::Bool(true));
    assert_eq!(row["priority"], Value::I64(5));
    assert_eq!(row["created_by_app_user_id"], Value::from("U1"));
    assert!(matches!(row["created_at"], Value::Timestamp(_)));
    assert_none!(row.get("internal_notes"));
    assert_none!(row.get("legacy_status"));
}

#[tokio::test]
async fn filter_sort_and_page() {
    let fx = fixture().await;

    let query = RecordQuery {
        filter: Condition::default().and("done", "eq", Operand::literal(false)),
        sort: vec![SortField::desc("priority")],
        limit: Some(2),
        offset: Some(1),
        ..RecordQuery::default()
    };

    let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert_eq!(ids(&page), [2, 4]);
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn contains_and_starts_with_are_literal() {
    let fx = fixture().await;

    let query = RecordQuery {
        filter: Condition::default().and("title", "starts_with", Operand::literal("Bu")),
        ..RecordQuery::default()
    };
    let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert_eq!(ids(&page), [1]);

    for pattern in ["%", "_"] {
        let query = RecordQuery {
            filter: Condition::default().and("title", "contains", Operand::literal(pattern)),
            ..RecordQuery::default()
        };
        let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
        assert_empty!(page.rows);
    }
}

#[tokio::test]
async fn special_values_in_filters() {
    let fx = fixture().await;

    let query = RecordQuery {
        filter: Condition::default().and("created_at", "lt", Operand::literal("$now")),
        ..RecordQuery::default()
    };
    let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert_eq!(page.total, 5);

    // An api key has no app user id; the clause matches nothing.
    let query = RecordQuery {
        filter: Condition::default().and(
            "created_by_app_user_id",
            "eq",
            Operand::literal("$current_app_user_id"),
        ),
        ..RecordQuery::default()
    };
    let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn field_names_are_never_interpolated() {
    let fx = fixture().await;

    for field in ["title; DROP TABLE todos", "title\" OR 1=1 --", "internal_notes"] {
        let query = RecordQuery {
            filter: Condition::default().and(field, "eq", Operand::literal("x")),
            ..RecordQuery::default()
        };
        let err = assert_err!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
        assert!(err.is_unknown_field());
    }
    assert!(fx.log.is_empty());

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn hostile_values_are_bound() {
    let fx = fixture().await;

    let payloads = [
        "' OR '1'='1",
        "x'); DROP TABLE todos; --",
        "Buy milk' --",
        "\\'; SELECT * FROM members; --",
    ];

    for payload in payloads {
        let query = RecordQuery {
            filter: Condition::default().and("title", "eq", Operand::literal(payload)),
            ..RecordQuery::default()
        };
        let page = assert_ok!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
        assert_empty!(page.rows);
        assert_eq!(page.total, 0);

        assert!(!fx.log.sql_contains(payload));
        assert!(fx.log.params_contain(payload));
    }

    let page = assert_ok!(
        fx.db
            .list_records(PROJECT, "todos", &api_key(), &RecordQuery::default())
            .await
    );
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn operator_must_fit_the_field() {
    let fx = fixture().await;

    let query = RecordQuery {
        filter: Condition::default().and("done", "gt", Operand::literal(true)),
        ..RecordQuery::default()
    };
    let err = assert_err!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert!(err.is_unknown_operator());

    let query = RecordQuery {
        filter: Condition::default().and("title", "regex", Operand::literal(".*")),
        ..RecordQuery::default()
    };
    let err = assert_err!(fx.db.list_records(PROJECT, "todos", &api_key(), &query).await);
    assert!(err.is_unknown_operator());
}

#[tokio::test]
async fn validate_lists_every_issue() {
    let fx = fixture().await;

    let condition = assert_ok!(Condition::from_json(&json!([
        {"field": "title", "operator": "eq", "value": "ok"},
        {"field": "ghost", "operator": "eq", "value": 1},
        {"field": "done", "operator": "contains", "value": true},
        {"field": "priority", "operator": "eq", "value": "high"},
    ])));

    let issues = assert_ok!(fx.db.validate(PROJECT, "todos", &condition).await);
    let clauses: Vec<_> = issues.iter().map(|issue| issue.clause).collect();
    assert_eq!(clauses, [1, 2, 3]);
    assert!(issues[0].error.is_unknown_field());
    assert!(issues[1].error.is_unknown_operator());
    assert!(issues[2].error.is_param_validation());

    let valid = Condition::default().and("status", "eq", Operand::literal("open"));
    assert_empty!(assert_ok!(fx.db.validate(PROJECT, "todos", &valid).await));
}
