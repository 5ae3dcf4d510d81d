use pretty_assertions::assert_eq;
use serde_json::json;
use tests::{prelude::*, *};

use warden::{engine::view::ViewPage, stmt::Value, ExecuteRequest};

fn request(params: serde_json::Value) -> ExecuteRequest {
    ExecuteRequest {
        params: serde_json::from_value(params).unwrap(),
        ..ExecuteRequest::default()
    }
}

fn names(page: &ViewPage) -> Vec<&str> {
    page.data
        .iter()
        .map(|row| assert_some!(row["name"].as_str()))
        .collect()
}

async fn adults() -> Fixture {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, MEMBERS, "allow", json!(null), "api_key"));
    fx.put_view(json!({
        "name": "adults",
        "base_collection_id": MEMBERS,
        "projection": ["name", "age"],
        "filters": [{"field": "age", "operator": "gte", "is_param": true, "param_name": "min_age"}],
        "sorts": [{"field": "age", "desc": true}],
        "params_schema": {"min_age": {"type": "number", "required": true}},
    }));
    fx
}

#[tokio::test]
async fn required_param_missing() {
    let fx = adults().await;

    let err = assert_err!(
        fx.db
            .compile_and_execute(PROJECT, "adults", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert!(err.is_param_validation());
    assert!(fx.log.is_empty());
}

#[tokio::test]
async fn executes_with_bound_param() {
    let fx = adults().await;

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "adults", &api_key(), &request(json!({"min_age": 18})))
            .await
    );
    assert_eq!(names(&page), ["Cyd", "Bob"]);
    assert_eq!(page.total, 2);
    assert_eq!(page.view_name, "adults");
    assert_eq!(page.view_version, 1);
    assert_eq!(page.data[0].keys().collect::<Vec<_>>(), ["name", "age"]);

    // The value is bound, never spliced into the text.
    assert!(fx.log.sql().iter().all(|sql| !sql.contains("18")));
}

#[tokio::test]
async fn view_respects_policy_row_filter() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!({"type": "app_user_owner"}), "app_user"));
    fx.put_view(json!({
        "name": "open_todos",
        "base_collection_id": TODOS,
        "filters": [{"field": "status", "operator": "eq", "value": "open"}],
    }));

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "open_todos", &app_user("U1"), &ExecuteRequest::default())
            .await
    );
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0]["title"], Value::from("Buy milk"));
}

#[tokio::test]
async fn deleted_and_hidden_fields_are_omitted() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({
        "name": "legacy",
        "base_collection_id": TODOS,
        "projection": ["title", "legacy_status", "internal_notes"],
    }));

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "legacy", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!(page.total, 5);
    for row in &page.data {
        assert_eq!(row.keys().collect::<Vec<_>>(), ["title"]);
    }
    assert!(!fx.log.sql_contains("legacy_status"));
    assert!(!fx.log.sql_contains("internal_notes"));
}

#[tokio::test]
async fn hidden_fields_usable_in_view_filters() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({
        "name": "by_note",
        "base_collection_id": TODOS,
        "filters": [{"field": "internal_notes", "operator": "eq", "value": "secret-2"}],
    }));

    let page = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "by_note", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!(page.total, 1);
    assert_none!(page.data[0].get("internal_notes"));
}

#[tokio::test]
async fn pagination_bounds() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({
        "name": "all",
        "base_collection_id": TODOS,
        "projection": ["id"],
        "default_limit": 2,
        "max_limit": 3,
    }));

    let run = |limit: Option<i64>, offset: Option<i64>| {
        let db = fx.db.clone();
        async move {
            let request = ExecuteRequest {
                limit,
                offset,
                ..ExecuteRequest::default()
            };
            db.compile_and_execute(PROJECT, "all", &api_key(), &request)
                .await
                .unwrap()
        }
    };

    let page = run(None, None).await;
    assert_eq!((page.data.len(), page.total, page.limit), (2, 5, 2));

    let page = run(Some(50), Some(3)).await;
    assert_eq!((page.data.len(), page.limit, page.offset), (2, 3, 3));
    assert_eq!(page.data[0]["id"], Value::I64(4));

    fx.log.clear();
    let page = run(Some(-1), Some(-10)).await;
    assert_eq!((page.data.len(), page.total, page.limit, page.offset), (0, 5, 0, 0));
    assert_eq!(fx.log.selects(), 0);
    assert_eq!(fx.log.counts(), 1);
}

#[tokio::test]
async fn max_rows_overrides_view_limits() {
    let fx = Fixture::with_config(warden::Config {
        max_rows: 1,
        ..warden::Config::default()
    })
    .await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({"name": "all", "base_collection_id": TODOS, "max_limit": 500}));

    let request = ExecuteRequest {
        limit: Some(400),
        ..ExecuteRequest::default()
    };
    let page = assert_ok!(fx.db.compile_and_execute(PROJECT, "all", &api_key(), &request).await);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn unused_params_do_not_change_results() {
    let fx = adults().await;

    let base = assert_ok!(
        fx.db
            .compile_and_execute(PROJECT, "adults", &api_key(), &request(json!({"min_age": 18})))
            .await
    );
    let extra = assert_ok!(
        fx.db
            .compile_and_execute(
                PROJECT,
                "adults",
                &api_key(),
                &request(json!({"min_age": 18, "unused": "'; DROP TABLE members; --"})),
            )
            .await
    );
    assert_eq!(base, extra);

    let sql = fx.log.sql();
    assert_eq!(sql[0], sql[2]);
    assert_eq!(sql[1], sql[3]);
}

#[tokio::test]
async fn compiled_plans_are_deterministic() {
    let fx = adults().await;
    let request = request(json!({"min_age": "21"}));

    let first = assert_ok!(fx.db.compile_plan(PROJECT, "adults", &api_key(), &request).await);
    let second = assert_ok!(fx.db.compile_plan(PROJECT, "adults", &api_key(), &request).await);
    assert_eq!(first, second);

    let page = assert_ok!(fx.db.execute_plan(PROJECT, &first, &api_key()).await);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn stale_plan_is_rejected() {
    let fx = adults().await;
    let request = request(json!({"min_age": 18}));

    let plan = assert_ok!(fx.db.compile_plan(PROJECT, "adults", &api_key(), &request).await);

    let version = assert_some!(fx.catalog.update_view(PROJECT, "adults", |view| {
        view.max_limit = 10;
    }));
    assert_eq!(version, 2);
    fx.db.invalidate_view(PROJECT, "adults").await;

    let err = assert_err!(fx.db.execute_plan(PROJECT, &plan, &api_key()).await);
    assert!(err.is_plan_stale());
    assert!(fx.log.is_empty());

    let plan = assert_ok!(fx.db.compile_plan(PROJECT, "adults", &api_key(), &request).await);
    assert_eq!(assert_some!(plan.view).version, 2);
}

#[tokio::test]
async fn plan_is_stale_after_schema_change() {
    let fx = Fixture::new().await;
    fx.add_policy(policy(1, TODOS, "allow", json!(null), "api_key"));
    fx.put_view(json!({
        "name": "todo_titles",
        "base_collection_id": TODOS,
        "projection": ["title", "status"],
    }));

    let plan = assert_ok!(
        fx.db
            .compile_plan(PROJECT, "todo_titles", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert_eq!(plan.schema_version, 1);

    fx.catalog.put_schema(PROJECT, schema_with(2, |status| status.soft_deleted()));
    fx.db.invalidate_project(PROJECT).await;

    let err = assert_err!(fx.db.execute_plan(PROJECT, &plan, &api_key()).await);
    assert!(err.is_plan_stale());
    assert!(fx.log.is_empty());

    // Recompiling drops the soft-deleted column.
    let plan = assert_ok!(
        fx.db
            .compile_plan(PROJECT, "todo_titles", &api_key(), &ExecuteRequest::default())
            .await
    );
    let page = assert_ok!(fx.db.execute_plan(PROJECT, &plan, &api_key()).await);
    assert!(page.rows.iter().all(|row| !row.contains_key("status")));
    assert!(!fx.log.sql_contains("\"status\""));
}

#[tokio::test]
async fn execute_plan_authorizes_the_caller() {
    let fx = adults().await;
    let request = request(json!({"min_age": 18}));

    // Compiling does not authorize; running does.
    let plan = assert_ok!(fx.db.compile_plan(PROJECT, "adults", &app_user("U1"), &request).await);
    let err = assert_err!(fx.db.execute_plan(PROJECT, &plan, &app_user("U1")).await);
    assert!(err.is_authorization_denied());
}

#[tokio::test]
async fn missing_and_inactive_views_are_denied() {
    let fx = adults().await;

    let err = assert_err!(
        fx.db
            .compile_and_execute(PROJECT, "nope", &api_key(), &ExecuteRequest::default())
            .await
    );
    assert!(err.is_authorization_denied());

    fx.catalog.update_view(PROJECT, "adults", |view| view.is_active = false);
    fx.db.invalidate_view(PROJECT, "adults").await;

    let err = assert_err!(
        fx.db
            .compile_and_execute(PROJECT, "adults", &api_key(), &request(json!({"min_age": 1})))
            .await
    );
    assert!(err.is_authorization_denied());
}
