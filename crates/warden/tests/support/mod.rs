#![allow(dead_code)]

use std_util::prelude::*;

use chrono::{DateTime, TimeZone, Utc};
use warden::{
    engine::{FieldResolver, Scope},
    policy::PolicyRecord,
    schema::{Alias, CollectionDef, FieldDef, FieldId, FieldType, Registry, TableRef},
    stmt::Value,
    Policy, Principal, Schema,
};

pub const TODOS: &str = "c_todos";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn schema() -> Schema {
    assert_ok!(Schema::builder()
        .version(1)
        .collection(
            CollectionDef::new(TODOS, "todos")
                .field(FieldDef::new("title", FieldType::String).required())
                .field(FieldDef::new("done", FieldType::Bool))
                .field(FieldDef::new("priority", FieldType::Int))
                .field(FieldDef::new("status", FieldType::String))
                .field(FieldDef::new("due_on", FieldType::Date))
                .field(FieldDef::new("internal_notes", FieldType::String).hidden())
                .field(FieldDef::new("legacy_flag", FieldType::Bool).soft_deleted()),
        )
        .collection(
            CollectionDef::new("c_members", "members")
                .field(FieldDef::new("name", FieldType::String))
                .field(FieldDef::new("age", FieldType::Int)),
        )
        .alias(Alias::field("state", TODOS, FieldId("status".into()), None))
        .build())
}

pub fn scope<'a>(schema: &'a Schema, collection: &str, principal: &'a Principal) -> Scope<'a> {
    let collection = assert_some!(schema.resolve_collection(collection));

    Scope {
        fields: FieldResolver {
            registry: schema,
            collection: collection.collection,
            now: now(),
            hidden: true,
        },
        principal,
    }
}

/// Builds a policy the way it is stored.
pub fn policy(
    id: i64,
    action: &str,
    effect: &str,
    condition: serde_json::Value,
    principals: &str,
) -> Policy {
    let record: PolicyRecord = serde_json::from_value(serde_json::json!({
        "id": id,
        "collection_id": TODOS,
        "name": format!("policy_{id}"),
        "action": action,
        "effect": effect,
        "condition_json": condition.to_string(),
        "allowed_principals": principals,
    }))
    .unwrap();

    assert_ok!(Policy::try_from(record))
}

/// A row of the `todos` table, keyed by column.
pub fn todo(id: i64, app_user: Option<&str>, status: &str, priority: i64) -> Vec<(&'static str, Value)> {
    vec![
        ("id", Value::I64(id)),
        ("created_by_app_user_id", Value::from(app_user)),
        ("status", Value::from(status)),
        ("priority", Value::I64(priority)),
    ]
}

pub fn app_user(id: &str) -> Principal {
    Principal::app_user(id, true)
}

pub fn api_key() -> Principal {
    Principal::api_key("key_1", Some("admin_1".into()))
}

pub fn table(schema: &Schema, collection: &str) -> TableRef {
    assert_some!(schema.resolve_collection(collection)).table
}
