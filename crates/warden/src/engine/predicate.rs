use warden_core::{
    condition::{Clause, Comparison, Operand, Operator, SpecialValue},
    schema::{Collection, FieldRef, Registry},
    stmt::{Expr, Value},
    Condition, Error, Principal, Result,
};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

/// Request parameter values by name, as received.
pub type ParamValues = IndexMap<String, serde_json::Value>;

/// Resolves logical field names of one collection to physical columns.
#[derive(Clone, Copy)]
pub struct FieldResolver<'a> {
    pub registry: &'a dyn Registry,
    pub collection: &'a Collection,

    /// Instant alias expiry is checked against.
    pub now: DateTime<Utc>,

    /// Whether hidden fields may be referenced. Only definitions authored by
    /// project administrators may filter on them.
    pub hidden: bool,
}

/// Everything a condition is compiled against.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    pub fields: FieldResolver<'a>,
    pub principal: &'a Principal,
}

/// A problem found by [`validate`].
#[derive(Debug, Clone)]
pub struct ConditionIssue {
    /// Position of the offending clause.
    pub clause: usize,
    pub field: Option<String>,
    pub error: Error,
}

impl<'a> FieldResolver<'a> {
    /// Resolves an active field by name, physical column or unexpired alias.
    pub fn resolve(&self, name: &str) -> Result<FieldRef<'a>> {
        let field = self
            .registry
            .lookup_field(&self.collection.id, name, self.now)
            .filter(|field| field.is_active() && (self.hidden || !field.field.is_hidden));

        field.ok_or_else(|| Error::unknown_field(&self.collection.name, name))
    }

    /// Resolves a field that may be projected or sorted on.
    pub fn readable(&self, name: &str) -> Option<FieldRef<'a>> {
        self.registry
            .lookup_field(&self.collection.id, name, self.now)
            .filter(|field| field.is_readable())
    }

    fn operator(&self, field: FieldRef<'_>, cmp: &Comparison) -> Result<Operator> {
        let Some(operator) = Operator::parse(&cmp.operator) else {
            return Err(Error::unknown_operator(&cmp.field, &cmp.operator, None));
        };

        if !operator.supports(field.ty()) {
            return Err(Error::unknown_operator(
                field.name(),
                operator.as_str(),
                Some(field.ty().as_str()),
            ));
        }

        Ok(operator)
    }
}

/// Compiles a condition into a predicate over the collection's columns.
///
/// Every value ends up as a bound parameter. An empty condition compiles to
/// `true`.
pub fn compile(condition: &Condition, scope: &Scope<'_>, params: &ParamValues) -> Result<Expr> {
    let operands = condition
        .clauses
        .iter()
        .map(|clause| compile_clause(clause, scope, params))
        .collect::<Result<Vec<_>>>()?;

    Ok(Expr::and_from_vec(operands))
}

fn compile_clause(clause: &Clause, scope: &Scope<'_>, params: &ParamValues) -> Result<Expr> {
    let cmp = match clause {
        Clause::Authenticated => return Ok(scope.principal.is_authenticated().into()),
        Clause::Or(branches) => {
            let branches = branches
                .iter()
                .map(|branch| compile(branch, scope, params))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Expr::or_from_vec(branches));
        }
        Clause::Not(inner) => return Ok(Expr::is_not_true(compile(inner, scope, params)?)),
        Clause::Compare(cmp) => cmp,
    };

    let field = scope.fields.resolve(&cmp.field)?;
    let operator = scope.fields.operator(field, cmp)?;

    let value = match &cmp.operand {
        Operand::Literal(json) => literal(field, json)?,
        Operand::Special(special) => match special_value(*special, scope, field)? {
            Some(value) => value,
            // The principal has no such identity; nothing can match.
            None => return Ok(false.into()),
        },
        Operand::Param(name) => {
            let json = params.get(name).ok_or_else(|| Error::missing_param(name))?;

            Value::from_json(json, field.ty().value_ty()).ok_or_else(|| {
                Error::param_validation(format!(
                    "parameter `{name}` is not a valid {} for field `{}`",
                    field.ty(),
                    field.name()
                ))
            })?
        }
    };

    Ok(comparison(field, operator, value))
}

fn literal(field: FieldRef<'_>, json: &serde_json::Value) -> Result<Value> {
    Value::from_json(json, field.ty().value_ty()).ok_or_else(|| {
        Error::param_validation(format!(
            "`{json}` is not a valid {} for field `{}`",
            field.ty(),
            field.name()
        ))
    })
}

fn special_value(
    special: SpecialValue,
    scope: &Scope<'_>,
    field: FieldRef<'_>,
) -> Result<Option<Value>> {
    let ty = field.ty().value_ty();

    let value = match special {
        SpecialValue::CurrentUserId => scope.principal.current_user_id(),
        SpecialValue::CurrentAppUserId => scope.principal.current_app_user_id(),
        SpecialValue::CurrentEmail => scope.principal.current_email(),
        SpecialValue::Now => {
            return match Value::Timestamp(scope.fields.now).cast(ty) {
                Some(value) => Ok(Some(value)),
                None => Err(now_mismatch(field)),
            }
        }
    };

    // A value that cannot be represented in the column's type matches nothing.
    Ok(value.and_then(|id| Value::from(id).cast(ty)))
}

fn now_mismatch(field: FieldRef<'_>) -> Error {
    Error::invalid_definition(format!(
        "`$now` cannot be compared with {} field `{}`",
        field.ty(),
        field.name()
    ))
}

fn comparison(field: FieldRef<'_>, operator: Operator, value: Value) -> Expr {
    let column = Expr::column(field.column().clone(), field.ty().value_ty());

    match operator {
        Operator::Eq => Expr::eq(column, value),
        Operator::Neq => Expr::ne(column, value),
        Operator::Gt => Expr::gt(column, value),
        Operator::Gte => Expr::ge(column, value),
        Operator::Lt => Expr::lt(column, value),
        Operator::Lte => Expr::le(column, value),
        Operator::Contains => match value {
            Value::String(needle) => Expr::contains(column, &needle),
            _ => false.into(),
        },
        Operator::StartsWith => match value {
            Value::String(prefix) => Expr::starts_with(column, &prefix),
            _ => false.into(),
        },
    }
}

/// Checks a condition against the schema without a principal or parameter
/// values, reporting every problem instead of stopping at the first.
///
/// Problems inside `or` / `not` groups are reported against the top-level
/// clause that contains them.
pub fn validate(condition: &Condition, fields: &FieldResolver<'_>) -> Vec<ConditionIssue> {
    let mut issues = vec![];

    for (index, clause) in condition.clauses.iter().enumerate() {
        validate_clause(index, clause, fields, &mut issues);
    }

    issues
}

fn validate_clause(
    index: usize,
    clause: &Clause,
    fields: &FieldResolver<'_>,
    issues: &mut Vec<ConditionIssue>,
) {
    let cmp = match clause {
        Clause::Compare(cmp) => cmp,
        Clause::Authenticated => return,
        Clause::Or(branches) => {
            for clause in branches.iter().flat_map(|branch| &branch.clauses) {
                validate_clause(index, clause, fields, issues);
            }
            return;
        }
        Clause::Not(inner) => {
            for clause in &inner.clauses {
                validate_clause(index, clause, fields, issues);
            }
            return;
        }
    };

    let mut issue = |error: Error| {
        issues.push(ConditionIssue {
            clause: index,
            field: Some(cmp.field.clone()),
            error,
        })
    };

    let field = match fields.resolve(&cmp.field) {
        Ok(field) => field,
        Err(err) => {
            issue(err);

            if Operator::parse(&cmp.operator).is_none() {
                issue(Error::unknown_operator(&cmp.field, &cmp.operator, None));
            }
            return;
        }
    };

    if let Err(err) = fields.operator(field, cmp) {
        issue(err);
    }

    match &cmp.operand {
        Operand::Literal(json) => {
            if let Err(err) = literal(field, json) {
                issue(err);
            }
        }
        Operand::Special(SpecialValue::Now) => {
            if Value::Timestamp(fields.now)
                .cast(field.ty().value_ty())
                .is_none()
            {
                issue(now_mismatch(field));
            }
        }
        Operand::Special(_) | Operand::Param(_) => {}
    }
}

impl fmt::Display for ConditionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clause {}: {}", self.clause, self.error)
    }
}
