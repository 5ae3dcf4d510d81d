use crate::{Error, Result};

use std::fmt;

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A constant from the definition, coerced to the field type.
    Literal(serde_json::Value),

    /// Substituted from the principal or the request clock.
    Special(SpecialValue),

    /// Looked up in the request parameters by name.
    Param(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialValue {
    CurrentUserId,
    CurrentAppUserId,
    CurrentEmail,
    Now,
}

impl Operand {
    pub fn literal(value: impl Into<serde_json::Value>) -> Operand {
        Operand::Literal(value.into())
    }

    pub fn param(name: impl Into<String>) -> Operand {
        Operand::Param(name.into())
    }
}

impl SpecialValue {
    /// Parses a `$`-prefixed special value name.
    pub fn parse(name: &str) -> Result<SpecialValue> {
        match name {
            "$current_user_id" => Ok(SpecialValue::CurrentUserId),
            "$current_app_user_id" => Ok(SpecialValue::CurrentAppUserId),
            "$current_email" => Ok(SpecialValue::CurrentEmail),
            "$now" => Ok(SpecialValue::Now),
            _ => Err(Error::invalid_definition(format!(
                "unknown special value `{name}`"
            ))),
        }
    }

    /// Maps the `principal.*` references accepted by `field_equals`.
    pub fn from_principal_reference(reference: &str) -> Option<SpecialValue> {
        match reference {
            "principal.user_id" => Some(SpecialValue::CurrentUserId),
            "principal.app_user_id" => Some(SpecialValue::CurrentAppUserId),
            "principal.email" => Some(SpecialValue::CurrentEmail),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpecialValue::CurrentUserId => "$current_user_id",
            SpecialValue::CurrentAppUserId => "$current_app_user_id",
            SpecialValue::CurrentEmail => "$current_email",
            SpecialValue::Now => "$now",
        }
    }
}

impl fmt::Display for SpecialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
