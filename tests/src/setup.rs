use crate::{ExecLog, LoggingDriver};

use chrono::{Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use warden::{
    policy::PolicyRecord,
    schema::{CollectionDef, FieldDef, FieldType},
    Config, Db, MemoryCatalog, Policy, Principal, Schema, View,
};
use warden_driver_sqlite::{timestamp_text, Sqlite};

pub const PROJECT: &str = "acme";
pub const TODOS: &str = "c_todos";
pub const MEMBERS: &str = "c_members";

/// A seeded SQLite file, a catalog describing it and a [`Db`] that logs
/// every statement it runs.
pub struct Fixture {
    pub db: Db,
    pub catalog: MemoryCatalog,
    pub log: ExecLog,
    path: PathBuf,
}

impl Fixture {
    pub async fn new() -> Fixture {
        Fixture::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Fixture {
        let path = std::env::temp_dir().join(format!("warden-tests-{}.db", uuid::Uuid::new_v4()));
        seed(&path);

        let catalog = MemoryCatalog::new();
        catalog.put_schema(PROJECT, schema());

        let driver = LoggingDriver::new(Box::new(Sqlite::open(&path)));
        let log = ExecLog::new(driver.ops_log_handle());

        let mut builder = Db::builder();
        builder.config(config).catalog(catalog.clone());
        let db = builder.build(driver).await.unwrap();

        Fixture {
            db,
            catalog,
            log,
            path,
        }
    }

    pub fn add_policy(&self, policy: Policy) {
        self.catalog.add_policy(PROJECT, policy);
    }

    pub fn put_view(&self, definition: serde_json::Value) -> u64 {
        let view = View::from_json(definition).unwrap();
        self.catalog.put_view(PROJECT, view)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Builds a policy the way it is stored.
pub fn policy(
    id: i64,
    collection: &str,
    effect: &str,
    condition: serde_json::Value,
    principals: &str,
) -> Policy {
    let record: PolicyRecord = serde_json::from_value(serde_json::json!({
        "id": id,
        "collection_id": collection,
        "name": format!("policy_{id}"),
        "action": "list",
        "effect": effect,
        "condition_json": condition.to_string(),
        "allowed_principals": principals,
    }))
    .unwrap();

    Policy::try_from(record).unwrap()
}

pub fn app_user(id: &str) -> Principal {
    Principal::app_user(id, true)
}

pub fn api_key() -> Principal {
    Principal::api_key("key_1", Some("admin_1".into()))
}

/// The schema describing the seeded tables.
pub fn schema() -> Schema {
    schema_with(1, |status| status)
}

/// The seeded schema at `version`, with the `status` field definition passed
/// through `status`.
pub fn schema_with(version: u64, status: impl FnOnce(FieldDef) -> FieldDef) -> Schema {
    Schema::builder()
        .version(version)
        .collection(
            CollectionDef::new(TODOS, "todos")
                .field(FieldDef::new("title", FieldType::String).required())
                .field(FieldDef::new("done", FieldType::Bool))
                .field(FieldDef::new("priority", FieldType::Int))
                .field(status(FieldDef::new("status", FieldType::String)))
                .field(FieldDef::new("internal_notes", FieldType::String).hidden()),
        )
        .collection(
            CollectionDef::new(MEMBERS, "members")
                .field(FieldDef::new("name", FieldType::String))
                .field(FieldDef::new("age", FieldType::Int)),
        )
        .build()
        .unwrap()
}

fn seed(path: &Path) {
    let connection = rusqlite::Connection::open(path).unwrap();

    // `legacy_status` lost its field definition but keeps its column.
    connection
        .execute_batch(
            "CREATE TABLE todos (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                created_by_user_id TEXT,
                created_by_app_user_id TEXT,
                title TEXT NOT NULL,
                done INTEGER NOT NULL DEFAULT 0,
                priority INTEGER,
                status TEXT,
                internal_notes TEXT,
                legacy_status TEXT
            );
            CREATE TABLE members (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                created_by_user_id TEXT,
                created_by_app_user_id TEXT,
                name TEXT,
                age INTEGER
            );",
        )
        .unwrap();

    let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

    let todos = [
        (1, Some("U1"), "Buy milk", false, 1, "open"),
        (2, Some("U2"), "Write report", false, 3, "open"),
        (3, Some("U1"), "Fix bike", true, 5, "done"),
        (4, Some("U1"), "Plan trip", false, 2, "blocked"),
        (5, None, "Call the bank", false, 4, "open"),
    ];

    for (id, owner, title, done, priority, status) in todos {
        let at = timestamp_text(&(base + Duration::days(id)));
        connection
            .execute(
                "INSERT INTO todos (id, created_at, updated_at, created_by_user_id,
                    created_by_app_user_id, title, done, priority, status, internal_notes,
                    legacy_status)
                 VALUES (?1, ?2, ?2, 'admin_1', ?3, ?4, ?5, ?6, ?7, ?8, 'legacy')",
                rusqlite::params![id, at, owner, title, done, priority, status, format!("secret-{id}")],
            )
            .unwrap();
    }

    let members = [(1, "Ann", 17), (2, "Bob", 18), (3, "Cyd", 40)];

    for (id, name, age) in members {
        let at = timestamp_text(&(base + Duration::days(id)));
        connection
            .execute(
                "INSERT INTO members (id, created_at, updated_at, name, age)
                 VALUES (?1, ?2, ?2, ?3, ?4)",
                rusqlite::params![id, at, name, age],
            )
            .unwrap();
    }
}
