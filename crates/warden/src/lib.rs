mod cache;

pub mod catalog;
pub use catalog::{Catalog, MemoryCatalog};

mod config;
pub use config::Config;

pub mod db;
pub use db::Db;

pub mod engine;
pub use engine::{
    Authorization, ConditionIssue, ExecuteRequest, Page, QueryPlan, RecordQuery, SortField, ViewPage,
};

pub use warden_core::{
    condition, driver, policy, principal, schema, stmt, view, Condition, Error, ExecutionFailure,
    Policy, Principal, Result, Schema, View,
};
