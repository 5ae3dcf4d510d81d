use super::predicate::{self, ParamValues, Scope};

use warden_core::{
    policy::{Action, Effect},
    stmt::Expr,
    Error, Policy, Result,
};

use tracing::{debug, warn};

/// Outcome of a successful authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorization {
    /// Restricts the rows the principal may see. Always conjoined with the
    /// query's own predicate.
    pub row_filter: Expr,

    /// Ids of the policies that took part, in evaluation order.
    pub applied: Vec<i64>,
}

impl Authorization {
    /// `true` when the principal may act but no row can match.
    pub fn is_empty(&self) -> bool {
        self.row_filter.is_false()
    }
}

/// Folds the collection's policies for `action` into a row filter.
///
/// Any deny that matches every row rejects the request regardless of
/// priority. Row-dependent denies hide exactly the rows their condition holds
/// for. The remaining allows are OR-ed together; with none, the request is
/// denied.
///
/// A policy whose condition no longer compiles against the schema is logged
/// and never leaks the cause: a broken allow grants nothing and a broken deny
/// denies the request.
pub fn authorize(policies: &[Policy], action: Action, scope: &Scope<'_>) -> Result<Authorization> {
    let collection = scope.fields.collection;

    if !collection.active {
        return Err(Error::authorization_denied());
    }

    let mut applicable: Vec<&Policy> = policies
        .iter()
        .filter(|policy| {
            policy.is_active
                && policy.collection_id == collection.id
                && policy.action == action
                && policy.applies_to(scope.principal)
        })
        .collect();

    applicable.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

    // Policies never take request parameters.
    let params = ParamValues::new();

    let mut denies = vec![];
    let mut allows = vec![];
    let mut applied = Vec::with_capacity(applicable.len());

    for policy in applicable {
        debug!(
            policy.id = policy.id,
            policy.name = %policy.name,
            priority = policy.priority,
            effect = ?policy.effect,
            "evaluating policy"
        );

        let expr = match predicate::compile(&policy.condition, scope, &params) {
            Ok(expr) => expr,
            Err(err) => {
                warn!(
                    policy.id = policy.id,
                    policy.name = %policy.name,
                    effect = ?policy.effect,
                    error = %err,
                    "policy condition does not compile"
                );

                match policy.effect {
                    // A deny that cannot be evaluated rejects the request.
                    Effect::Deny => return Err(Error::authorization_denied()),
                    Effect::Allow => continue,
                }
            }
        };

        applied.push(policy.id);

        match policy.effect {
            Effect::Deny if expr.is_true() => {
                debug!(policy.id = policy.id, "denied by policy");
                return Err(Error::authorization_denied());
            }
            // Rows the deny cannot decide on (NULL columns) stay visible.
            Effect::Deny => denies.push(Expr::is_not_true(expr)),
            Effect::Allow => allows.push(expr),
        }
    }

    if allows.is_empty() {
        return Err(Error::authorization_denied());
    }

    let mut operands = vec![Expr::or_from_vec(allows)];
    operands.extend(denies);

    Ok(Authorization {
        row_filter: Expr::and_from_vec(operands),
        applied,
    })
}
