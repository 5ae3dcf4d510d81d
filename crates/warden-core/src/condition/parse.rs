use super::{Clause, Condition, Operand, SpecialValue};
use crate::{Error, Result};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

impl Condition {
    /// Parses a stored condition.
    ///
    /// Accepted forms: `null`, a list of clause objects, a single clause
    /// object, `{"and": [...]}`, `{"or": [...]}` and the typed shorthands
    /// `owner`, `app_user_owner`, `authenticated`, `field_equals`, `and`,
    /// `or` and `not`.
    pub fn from_json(value: &Value) -> Result<Condition> {
        let mut clauses = vec![];
        collect(value, &mut clauses)?;
        Ok(Condition { clauses })
    }

    pub fn from_json_str(src: &str) -> Result<Condition> {
        let value: Value = serde_json::from_str(src)?;
        Condition::from_json(&value)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Condition::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn collect(value: &Value, clauses: &mut Vec<Clause>) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                collect(item, clauses)?;
            }
            Ok(())
        }
        Value::Object(object) => collect_object(object, clauses),
        other => Err(Error::invalid_definition(format!(
            "expected a condition object or list, found `{other}`"
        ))),
    }
}

fn collect_object(object: &Map<String, Value>, clauses: &mut Vec<Clause>) -> Result<()> {
    if let Some(operands) = object.get("and") {
        return collect_list(operands, clauses);
    }

    if let Some(branches) = object.get("or") {
        clauses.push(Clause::Or(branch_list(branches)?));
        return Ok(());
    }

    let Some(ty) = object.get("type") else {
        if object.is_empty() {
            return Ok(());
        }

        clauses.push(comparison(object)?);
        return Ok(());
    };

    match ty.as_str() {
        Some("owner") => {
            let field = str_field(object, "field")?.unwrap_or("created_by_user_id");
            clauses.push(Clause::compare(
                field,
                "eq",
                Operand::Special(SpecialValue::CurrentUserId),
            ));
        }
        Some("app_user_owner") => {
            let field = str_field(object, "field")?.unwrap_or("created_by_app_user_id");
            clauses.push(Clause::compare(
                field,
                "eq",
                Operand::Special(SpecialValue::CurrentAppUserId),
            ));
        }
        Some("authenticated") => clauses.push(Clause::Authenticated),
        Some("field_equals") => {
            let mut object = object.clone();
            object.insert("operator".into(), Value::from("eq"));

            let reference = object
                .get("value")
                .and_then(Value::as_str)
                .and_then(SpecialValue::from_principal_reference);

            if let Some(special) = reference {
                object.remove("value");
                object.insert("special_value".into(), Value::from(special.as_str()));
            }

            clauses.push(comparison(&object)?);
        }
        Some("and") => {
            if let Some(operands) = object.get("conditions") {
                collect_list(operands, clauses)?;
            }
        }
        Some("or") => {
            let branches = match object.get("conditions") {
                Some(branches) => branch_list(branches)?,
                None => vec![],
            };
            clauses.push(Clause::Or(branches));
        }
        Some("not") => {
            let Some(inner) = object.get("condition") else {
                return Err(Error::invalid_definition("`not` is missing `condition`"));
            };
            clauses.push(Clause::Not(Condition::from_json(inner)?));
        }
        Some(other) => {
            return Err(Error::invalid_definition(format!(
                "unsupported condition type `{other}`"
            )))
        }
        None => {
            return Err(Error::invalid_definition(
                "condition `type` must be a string",
            ))
        }
    }

    Ok(())
}

fn collect_list(value: &Value, clauses: &mut Vec<Clause>) -> Result<()> {
    if !value.is_array() {
        return Err(Error::invalid_definition("`and` expects a list of conditions"));
    }

    collect(value, clauses)
}

/// Each item of an `or` list is a condition of its own.
fn branch_list(value: &Value) -> Result<Vec<Condition>> {
    let Value::Array(items) = value else {
        return Err(Error::invalid_definition("`or` expects a list of conditions"));
    };

    items.iter().map(Condition::from_json).collect()
}

fn comparison(object: &Map<String, Value>) -> Result<Clause> {
    let Some(field) = str_field(object, "field")? else {
        return Err(Error::invalid_definition("condition clause is missing `field`"));
    };

    let operator = match str_field(object, "operator")? {
        Some(operator) => operator,
        None => str_field(object, "op")?
            .ok_or_else(|| Error::invalid_definition("condition clause is missing `operator`"))?,
    };

    Ok(Clause::compare(field, operator, operand(field, object)?))
}

fn operand(field: &str, object: &Map<String, Value>) -> Result<Operand> {
    if let Some(name) = str_field(object, "param")? {
        return Ok(Operand::param(name));
    }

    if object.get("is_param").and_then(Value::as_bool) == Some(true) {
        let name = str_field(object, "param_name")?.unwrap_or(field);
        return Ok(Operand::param(name));
    }

    if let Some(name) = str_field(object, "special_value")? {
        return Ok(Operand::Special(SpecialValue::parse(name)?));
    }

    match object.get("value") {
        // `$$` escapes a literal leading dollar sign
        Some(Value::String(s)) if s.starts_with("$$") => Ok(Operand::literal(&s[1..])),
        Some(Value::String(s)) if s.starts_with('$') => Ok(Operand::Special(SpecialValue::parse(s)?)),
        Some(value) => Ok(Operand::Literal(value.clone())),
        None => Err(Error::invalid_definition(format!(
            "condition clause on `{field}` has no value"
        ))),
    }
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(Error::invalid_definition(format!(
            "condition `{key}` must be a string"
        ))),
    }
}
