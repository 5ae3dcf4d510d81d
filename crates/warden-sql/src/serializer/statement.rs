use super::{Comma, Formatter, Params, ToSql};

use warden_core::stmt;

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Count(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let columns = Comma(self.returning.iter().map(|column| &column.name));
        let filter = Where(&self.filter);
        let order_by = (!self.order_by.is_empty()).then(|| OrderBy(&self.order_by));
        let source = &self.source;

        fmt!(f, "SELECT " columns " FROM " source filter order_by self.limit);
    }
}

impl ToSql for &stmt::Count {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = Where(&self.filter);
        let source = &self.source;

        fmt!(f, "SELECT COUNT(*) FROM " source filter);
    }
}

/// `WHERE` clause, omitted when the filter is always true.
struct Where<'a>(&'a stmt::Expr);

impl ToSql for Where<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if !self.0.is_true() {
            fmt!(f, " WHERE " self.0);
        }
    }
}

struct OrderBy<'a>(&'a [stmt::OrderByExpr]);

impl ToSql for OrderBy<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, " ORDER BY " Comma(self.0));
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let order = match self.order {
            stmt::Direction::Asc => " ASC",
            stmt::Direction::Desc => " DESC",
        };

        fmt!(f, &self.column.name order);
    }
}

impl ToSql for stmt::Limit {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let limit = bind_count(f, self.limit);
        let offset = bind_count(f, self.offset);

        fmt!(f, " LIMIT " limit " OFFSET " offset);
    }
}

fn bind_count<P: Params>(f: &mut Formatter<'_, P>, n: u64) -> super::Placeholder {
    let value = stmt::Value::I64(i64::try_from(n).unwrap_or(i64::MAX));
    f.params.push(&value, Some(&stmt::Type::I64))
}
