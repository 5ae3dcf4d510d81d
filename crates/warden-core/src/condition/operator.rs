use crate::schema::FieldType;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
}

impl Operator {
    /// Parses an operator name. The symbolic comparison forms (`=`, `!=`,
    /// `>`, ...) are accepted as well.
    pub fn parse(name: &str) -> Option<Operator> {
        Some(match name {
            "eq" | "=" | "==" => Operator::Eq,
            "neq" | "ne" | "!=" | "<>" => Operator::Neq,
            "gt" | ">" => Operator::Gt,
            "gte" | "ge" | ">=" => Operator::Gte,
            "lt" | "<" => Operator::Lt,
            "lte" | "le" | "<=" => Operator::Lte,
            "contains" => Operator::Contains,
            "starts_with" => Operator::StartsWith,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
        }
    }

    pub fn is_pattern(self) -> bool {
        matches!(self, Operator::Contains | Operator::StartsWith)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Returns `true` if the operator may be applied to a field of type `ty`.
    pub fn supports(self, ty: FieldType) -> bool {
        if self.is_pattern() {
            ty == FieldType::String
        } else if self.is_ordering() {
            ty.is_ordered()
        } else {
            true
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
