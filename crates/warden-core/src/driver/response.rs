use crate::{stmt::ValueRecord, Result};

#[derive(Debug)]
pub enum Response {
    /// Rows in query order, one value per returned column.
    Rows(Vec<ValueRecord>),

    Count(u64),
}

impl Response {
    pub fn into_rows(self) -> Result<Vec<ValueRecord>> {
        match self {
            Response::Rows(rows) => Ok(rows),
            Response::Count(_) => Err(crate::err!("expected rows, driver returned a count")),
        }
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Response::Count(count) => Ok(count),
            Response::Rows(_) => Err(crate::err!("expected a count, driver returned rows")),
        }
    }
}
