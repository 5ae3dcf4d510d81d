use super::{Formatter, Params, ToSql};

use warden_core::schema;

/// A quoted identifier. Embedded quotes are doubled.
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push('"');
        for c in self.0.as_ref().chars() {
            if c == '"' {
                f.dst.push('"');
            }
            f.dst.push(c);
        }
        f.dst.push('"');
    }
}

impl ToSql for &schema::Ident {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        Ident(self.as_str()).to_sql(f);
    }
}

impl ToSql for &schema::TableRef {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match &self.namespace {
            Some(namespace) => fmt!(f, super::Period([namespace, &self.name])),
            None => fmt!(f, &self.name),
        }
    }
}
