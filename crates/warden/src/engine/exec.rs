use super::view::QueryPlan;

use warden_core::{
    driver::Response,
    stmt::{Count, Expr, Limit, Select, Statement, Value},
    Connection, Error, ExecutionFailure, Result,
};

use indexmap::IndexMap;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Timed-out queries are attempted at most this many times.
const MAX_ATTEMPTS: usize = 2;

/// Rows of one page, keyed by logical field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub rows: Vec<IndexMap<String, Value>>,

    /// Matching rows before pagination.
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl QueryPlan {
    /// The row query, with `row_filter` conjoined to the plan's predicate.
    pub fn select(&self, row_filter: &Expr) -> Select {
        Select {
            source: self.source.clone(),
            returning: self.projection.iter().map(|p| p.column.clone()).collect(),
            filter: Expr::and(self.predicate.clone(), row_filter.clone()),
            order_by: self.order_by.clone(),
            limit: Some(Limit {
                limit: self.limit,
                offset: self.offset,
            }),
        }
    }

    /// The pre-pagination count under the same predicate as [`select`].
    ///
    /// [`select`]: QueryPlan::select
    pub fn count(&self, row_filter: &Expr) -> Count {
        Count {
            source: self.source.clone(),
            filter: Expr::and(self.predicate.clone(), row_filter.clone()),
        }
    }
}

/// Runs the plan's row and count queries on one connection.
///
/// Both queries run within the returned future; dropping it abandons both.
pub async fn execute(
    conn: &mut dyn Connection,
    plan: &QueryPlan,
    row_filter: &Expr,
    timeout: Duration,
) -> Result<Page> {
    let rows = if plan.limit == 0 {
        vec![]
    } else {
        run(conn, plan.select(row_filter).into(), timeout)
            .await?
            .into_rows()
            .map_err(wrap)?
    };

    let total = run(conn, plan.count(row_filter).into(), timeout)
        .await?
        .into_count()
        .map_err(wrap)?;

    let mut rows: Vec<_> = rows
        .into_iter()
        .map(|record| {
            plan.projection
                .iter()
                .map(|projected| projected.name.clone())
                .zip(record)
                .collect::<IndexMap<_, _>>()
        })
        .collect();

    rows.truncate(plan.limit as usize);

    Ok(Page {
        rows,
        total,
        limit: plan.limit,
        offset: plan.offset,
    })
}

async fn run(conn: &mut dyn Connection, statement: Statement, timeout: Duration) -> Result<Response> {
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(timeout, conn.exec(statement.clone().into())).await {
            Ok(result) => result,
            Err(_) => Err(Error::execution(ExecutionFailure::Timeout)),
        };

        match result {
            Ok(response) => return Ok(response),
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                warn!(attempt, "query timed out; retrying");
                attempt += 1;
            }
            Err(err) => return Err(wrap(err)),
        }
    }
}

/// Driver errors are already categorized. Anything else is reduced to a
/// generic failure so that it cannot reach the caller.
fn wrap(err: Error) -> Error {
    if err.is_execution() {
        return err;
    }

    warn!(error = %err, "query execution failed");
    Error::execution(ExecutionFailure::Other)
}
