use pretty_assertions::assert_eq;
use serde_json::json;
use std_util::prelude::*;
use warden_core::stmt::Direction;
use warden_core::view::{ParamType, SortDirection, SortKey, SortSpec, ViewRecord};
use warden_core::View;

fn record() -> ViewRecord {
    ViewRecord {
        id: 1,
        name: "adults".into(),
        display_name: "Adults".into(),
        base_collection_id: "c_people".into(),
        projection_json: Some(r#"["name", "age"]"#.into()),
        filters_json: Some(
            r#"[{"field": "age", "operator": ">=", "is_param": true, "param_name": "min_age"}]"#
                .into(),
        ),
        sorts_json: Some(
            r#"[{"field": "age", "is_param": true, "param_name": "sort_by",
                 "desc_is_param": true, "desc_param_name": "order"}]"#
                .into(),
        ),
        params_schema_json: Some(
            r#"{"min_age": {"type": "number", "required": true},
                "sort_by": {"type": "sort_field"},
                "order": {"type": "sort_direction", "default": "asc"}}"#
                .into(),
        ),
        default_limit: 50,
        max_limit: 200,
        version: 4,
        is_active: true,
    }
}

#[test]
fn converts_stored_record() {
    let view = assert_ok!(View::try_from(record()));

    assert_eq!(view.projection, Some(vec!["name".to_string(), "age".to_string()]));
    assert_eq!(view.filters.params().collect::<Vec<_>>(), ["min_age"]);
    assert_eq!(
        view.sorts,
        [SortSpec {
            key: SortKey::Param {
                name: "sort_by".into(),
                fallback: Some("age".into()),
            },
            direction: SortDirection::Param {
                name: "order".into(),
                fallback: Direction::Asc,
            },
        }]
    );
    assert_eq!(view.params["min_age"].ty, ParamType::Number);
    assert!(view.params["min_age"].required);
    assert_eq!(view.params["order"].default, Some(json!("asc")));
    assert_eq!(view.version, 4);
}

#[test]
fn empty_parts_use_defaults() {
    let view = assert_ok!(View::try_from(ViewRecord {
        projection_json: None,
        filters_json: Some(String::new()),
        sorts_json: Some("null".into()),
        params_schema_json: None,
        ..record()
    }));

    assert_eq!(view.projection, None);
    assert!(view.filters.is_empty());
    assert!(view.sorts.is_empty());
    assert!(view.params.is_empty());
}

#[test]
fn malformed_parts_are_invalid_definitions() {
    let err = assert_err!(View::try_from(ViewRecord {
        sorts_json: Some(r#"[{"desc": true}]"#.into()),
        ..record()
    }));
    assert!(err.is_invalid_definition());

    let err = assert_err!(View::try_from(ViewRecord {
        params_schema_json: Some(r#"{"x": {"type": "blob"}}"#.into()),
        ..record()
    }));
    assert!(err.is_invalid_definition());
}

#[test]
fn deserializes_from_json() {
    let view = assert_ok!(View::from_json(json!({
        "name": "recent",
        "base_collection_id": "c_todos",
        "sorts": [{"field": "created_at", "desc": true}],
        "params_schema": {"page_size": {"type": "limit"}}
    })));

    assert_eq!(view.sorts, [SortSpec::desc("created_at")]);
    assert_eq!(view.params["page_size"].ty, ParamType::Limit);
    assert_eq!(view.default_limit, 100);
    assert_eq!(view.max_limit, 1000);
    assert_eq!(view.version, 1);
}
