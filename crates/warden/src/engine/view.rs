use super::predicate::{self, ParamValues, Scope};
use crate::Config;

use warden_core::{
    schema::{Collection, CollectionId, TableRef},
    stmt::{Direction, Expr, ExprColumn, OrderByExpr, Value},
    view::{ParamType, SortDirection, SortKey},
    Condition, Error, Result, View,
};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::HashSet;

/// Caller input for running a view.
#[derive(Debug, Clone, Default)]
pub struct ExecuteRequest {
    pub params: ParamValues,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Identifies the view definition a plan was compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStamp {
    pub name: String,
    pub version: u64,
}

/// A returned column and the logical name it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct Projected {
    pub name: String,
    pub column: ExprColumn,
}

/// A fully bound, ready to execute query over one collection.
///
/// Plans hold no reference to the snapshots they were compiled from and can
/// be cached by the caller. The principal's row filter is not part of the
/// plan; it is supplied at execution.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// `None` for ad-hoc record listings.
    pub view: Option<ViewStamp>,

    /// Version of the schema the columns were resolved against.
    pub schema_version: u64,
    pub collection_id: CollectionId,
    pub source: TableRef,
    pub projection: Vec<Projected>,
    pub predicate: Expr,
    pub order_by: Vec<OrderByExpr>,
    pub limit: u64,
    pub offset: u64,
}

/// One page of view results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewPage {
    pub data: Vec<IndexMap<String, Value>>,

    /// Matching rows before pagination.
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub view_name: String,
    pub view_version: u64,
}

/// Compiles a view and request into a plan.
///
/// `scope` must resolve fields of the view's base collection. The result only
/// depends on its inputs, so equal inputs produce equal plans.
pub fn compile(
    view: &View,
    source: TableRef,
    scope: &Scope<'_>,
    request: &ExecuteRequest,
    config: &Config,
) -> Result<QueryPlan> {
    compile_inner(view, source, scope, request, config)
        .map_err(|err| err.context(warden_core::err!("view `{}`", view.name)))
}

fn compile_inner(
    view: &View,
    source: TableRef,
    scope: &Scope<'_>,
    request: &ExecuteRequest,
    config: &Config,
) -> Result<QueryPlan> {
    let bound = bind_params(view, &request.params)?;
    let filters = active_filters(view, &bound, config)?;
    let predicate = predicate::compile(&filters, scope, &bound)?;
    let order_by = order_by(view, scope, &bound)?;
    let projection = project(view, scope);

    let requested_limit = typed_param(view, &bound, ParamType::Limit).or(request.limit);
    let requested_offset = typed_param(view, &bound, ParamType::Offset).or(request.offset);

    let limit = requested_limit
        .map(|limit| limit.max(0) as u64)
        .unwrap_or(view.default_limit)
        .min(view.max_limit)
        .min(config.max_rows);

    Ok(QueryPlan {
        view: Some(ViewStamp {
            name: view.name.clone(),
            version: view.version,
        }),
        schema_version: scope.fields.registry.version(),
        collection_id: view.base_collection_id.clone(),
        source,
        projection,
        predicate,
        order_by,
        limit,
        offset: requested_offset.unwrap_or(0).max(0) as u64,
    })
}

/// Checks request values against the declared parameters and normalizes
/// them. Sort parameters are bound even when undeclared; any other
/// undeclared request parameter is ignored.
fn bind_params(view: &View, params: &ParamValues) -> Result<ParamValues> {
    let mut bound = ParamValues::new();

    for (name, spec) in &view.params {
        let value = params
            .get(name)
            .filter(|value| !value.is_null())
            .or(spec.default.as_ref());

        let Some(value) = value else {
            if spec.required {
                return Err(Error::missing_param(name));
            }
            continue;
        };

        bound.insert(name.clone(), normalize(name, spec.ty, value)?);
    }

    for (name, ty) in sort_params(view) {
        if view.params.contains_key(name) {
            continue;
        }

        if let Some(value) = params.get(name).filter(|value| !value.is_null()) {
            bound.insert(name.to_string(), normalize(name, ty, value)?);
        }
    }

    Ok(bound)
}

/// Parameters the view's sorts read, with the type they are read as.
fn sort_params(view: &View) -> impl Iterator<Item = (&str, ParamType)> + '_ {
    view.sorts.iter().flat_map(|sort| {
        let key = match &sort.key {
            SortKey::Param { name, .. } => Some((name.as_str(), ParamType::SortField)),
            SortKey::Field(_) => None,
        };

        let direction = match &sort.direction {
            SortDirection::Param { name, .. } => Some((name.as_str(), ParamType::SortDirection)),
            SortDirection::Fixed(_) => None,
        };

        key.into_iter().chain(direction)
    })
}

fn normalize(name: &str, ty: ParamType, value: &Json) -> Result<Json> {
    let normalized = match (ty, value) {
        (ParamType::String | ParamType::SortField, Json::String(_)) => Some(value.clone()),
        (ParamType::Number, Json::Number(_)) => Some(value.clone()),
        (ParamType::Number, Json::String(text)) => parse_number(text.trim()),
        (ParamType::Boolean | ParamType::SortDirection, Json::Bool(_)) => Some(value.clone()),
        (ParamType::Boolean, Json::String(text)) => match text.as_str() {
            "true" => Some(Json::Bool(true)),
            "false" => Some(Json::Bool(false)),
            _ => None,
        },
        (ParamType::Limit | ParamType::Offset, _) => {
            Value::from_json(value, warden_core::stmt::Type::I64)
                .and_then(|value| value.as_i64())
                .map(Json::from)
        }
        (ParamType::SortDirection, Json::String(text)) => {
            match text.to_ascii_lowercase().as_str() {
                "asc" => Some(Json::Bool(false)),
                "desc" => Some(Json::Bool(true)),
                _ => None,
            }
        }
        _ => None,
    };

    normalized.ok_or_else(|| not_a(name, ty))
}

fn not_a(name: &str, ty: ParamType) -> Error {
    Error::param_validation(format!("parameter `{name}` must be a {}", ty.as_str()))
}

fn parse_number(text: &str) -> Option<Json> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Json::from(int));
    }

    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Json::Number)
}

/// Drops filter clauses whose optional parameters are absent.
fn active_filters(view: &View, bound: &ParamValues, config: &Config) -> Result<Condition> {
    if view.filters.len() > config.max_filters {
        return Err(Error::invalid_definition(format!(
            "{} filters exceed the limit of {}",
            view.filters.len(),
            config.max_filters
        )));
    }

    let mut clauses = Vec::with_capacity(view.filters.len());

    for clause in &view.filters.clauses {
        let params = clause.params();

        if let Some(name) = params.iter().find(|name| !view.params.contains_key(**name)) {
            return Err(Error::invalid_definition(format!(
                "filter references undeclared parameter `{name}`"
            )));
        }

        // A group is dropped as a whole when any of its parameters is absent.
        if params.iter().any(|name| !bound.contains_key(*name)) {
            continue;
        }

        clauses.push(clause.clone());
    }

    Ok(clauses.into())
}

fn order_by(view: &View, scope: &Scope<'_>, bound: &ParamValues) -> Result<Vec<OrderByExpr>> {
    let mut order_by = Vec::with_capacity(view.sorts.len());

    for sort in &view.sorts {
        let (name, from_param) = match &sort.key {
            SortKey::Field(name) => (name.as_str(), false),
            SortKey::Param { name, fallback } => match bound.get(name) {
                Some(value) => match value.as_str() {
                    Some(value) => (value, true),
                    None => return Err(not_a(name, ParamType::SortField)),
                },
                None => match fallback {
                    Some(fallback) => (fallback.as_str(), false),
                    None => continue,
                },
            },
        };

        let Some(field) = scope.fields.readable(name) else {
            if from_param {
                return Err(Error::param_validation(format!(
                    "`{name}` is not a sortable field"
                )));
            }

            return Err(Error::unknown_field(&scope.fields.collection.name, name));
        };

        // Declared parameters of another type still carry `asc` / `desc`.
        let direction = match &sort.direction {
            SortDirection::Fixed(direction) => *direction,
            SortDirection::Param { name, fallback } => match bound.get(name) {
                Some(value) => normalize(name, ParamType::SortDirection, value)?
                    .as_bool()
                    .map(Direction::from_desc)
                    .ok_or_else(|| not_a(name, ParamType::SortDirection))?,
                None => *fallback,
            },
        };

        order_by.push(OrderByExpr {
            column: column(field.field),
            order: direction,
        });
    }

    if order_by.is_empty() {
        order_by.extend(default_order(scope));
    }

    Ok(order_by)
}

pub(super) fn default_order(scope: &Scope<'_>) -> Option<OrderByExpr> {
    scope
        .fields
        .readable("id")
        .map(|field| OrderByExpr::asc(column(field.field)))
}

/// Declared projection restricted to readable fields. Fields that were
/// removed or hidden since the view was authored are dropped silently.
fn project(view: &View, scope: &Scope<'_>) -> Vec<Projected> {
    let Some(names) = &view.projection else {
        return readable(scope.fields.collection);
    };

    let mut seen = HashSet::new();
    let mut projection = vec![];

    for name in names {
        let Some(field) = scope.fields.readable(name) else {
            continue;
        };

        if seen.insert(field.column()) {
            projection.push(Projected {
                name: field.name().to_string(),
                column: column(field.field),
            });
        }
    }

    if projection.is_empty() {
        projection.extend(readable(scope.fields.collection).into_iter().take(1));
    }

    projection
}

/// Every readable field, system fields first.
pub(super) fn readable(collection: &Collection) -> Vec<Projected> {
    collection
        .readable_fields()
        .map(|field| Projected {
            name: field.name.clone(),
            column: column(field),
        })
        .collect()
}

fn column(field: &warden_core::schema::Field) -> ExprColumn {
    ExprColumn::new(field.column.clone(), field.ty.value_ty())
}

fn typed_param(view: &View, bound: &ParamValues, ty: ParamType) -> Option<i64> {
    view.params
        .iter()
        .filter(|(_, spec)| spec.ty == ty)
        .find_map(|(name, _)| bound.get(name))
        .and_then(Json::as_i64)
}
