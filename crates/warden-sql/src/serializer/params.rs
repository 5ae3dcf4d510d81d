use super::{Flavor, Formatter, ToSql};

use warden_core::stmt;

pub trait Params {
    fn push(&mut self, param: &stmt::Value, ty: Option<&stmt::Type>) -> Placeholder;
}

/// 1-based position of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

/// A bound parameter together with the type of the column it is compared
/// against, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub value: stmt::Value,
    pub ty: Option<stmt::Type>,
}

impl Params for Vec<stmt::Value> {
    fn push(&mut self, value: &stmt::Value, _ty: Option<&stmt::Type>) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl Params for Vec<TypedValue> {
    fn push(&mut self, value: &stmt::Value, ty: Option<&stmt::Type>) -> Placeholder {
        self.push(TypedValue {
            value: value.clone(),
            ty: ty.copied().or_else(|| value.ty()),
        });
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: super::Params>(self, f: &mut Formatter<'_, P>) {
        let prefix = match f.serializer.flavor {
            Flavor::Postgresql => '$',
            Flavor::Sqlite => '?',
        };

        f.dst.push(prefix);
        f.dst.push_str(&self.0.to_string());
    }
}
