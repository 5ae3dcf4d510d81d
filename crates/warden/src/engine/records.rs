use super::{
    predicate::{self, ParamValues, Scope},
    view::{self, QueryPlan},
};
use crate::Config;

use warden_core::{
    schema::TableRef,
    stmt::{Direction, ExprColumn, OrderByExpr},
    view::DEFAULT_LIMIT,
    Condition, Error, Result,
};

/// An ad-hoc listing of a collection's records, as sent by a client.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub filter: Condition,
    pub sort: Vec<SortField>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,

    /// Values for `param` operands in `filter`.
    pub params: ParamValues,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub desc: bool,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> SortField {
        SortField {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> SortField {
        SortField {
            field: field.into(),
            desc: true,
        }
    }
}

/// Compiles a record listing into a plan over every readable field.
///
/// Client filters cannot reference hidden fields, even when a policy can.
pub fn compile(
    query: &RecordQuery,
    source: TableRef,
    scope: &Scope<'_>,
    config: &Config,
) -> Result<QueryPlan> {
    let mut scope = *scope;
    scope.fields.hidden = false;

    if query.filter.len() > config.max_filters {
        return Err(Error::param_validation(format!(
            "{} filters exceed the limit of {}",
            query.filter.len(),
            config.max_filters
        )));
    }

    let predicate = predicate::compile(&query.filter, &scope, &query.params)?;

    let mut order_by = Vec::with_capacity(query.sort.len());

    for sort in &query.sort {
        let field = scope.fields.readable(&sort.field).ok_or_else(|| {
            Error::param_validation(format!("`{}` is not a sortable field", sort.field))
        })?;

        order_by.push(OrderByExpr {
            column: ExprColumn::new(field.column().clone(), field.ty().value_ty()),
            order: Direction::from_desc(sort.desc),
        });
    }

    if order_by.is_empty() {
        order_by.extend(view::default_order(&scope));
    }

    let limit = query
        .limit
        .map(|limit| limit.max(0) as u64)
        .unwrap_or(DEFAULT_LIMIT)
        .min(config.max_rows);

    Ok(QueryPlan {
        view: None,
        schema_version: scope.fields.registry.version(),
        collection_id: scope.fields.collection.id.clone(),
        source,
        projection: view::readable(scope.fields.collection),
        predicate,
        order_by,
        limit,
        offset: query.offset.unwrap_or(0).max(0) as u64,
    })
}
