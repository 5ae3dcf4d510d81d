use crate::{
    principal::{Principal, PrincipalKind},
    schema::CollectionId,
    Condition, Error, Result,
};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Principals a policy applies to when none are listed.
pub const DEFAULT_ALLOWED_PRINCIPALS: [PrincipalKind; 2] =
    [PrincipalKind::AdminUser, PrincipalKind::ApiKey];

/// An access rule attached to one collection and one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: i64,
    pub collection_id: CollectionId,
    pub name: String,
    pub action: Action,
    pub effect: Effect,

    /// Rows the policy applies to. Empty means every row.
    pub condition: Condition,

    /// Orders evaluation for diagnostics only.
    pub priority: i32,

    /// Never empty: an empty stored list is replaced by
    /// [`DEFAULT_ALLOWED_PRINCIPALS`].
    pub allowed_principals: Vec<PrincipalKind>,

    /// App users must have verified their email for the policy to apply.
    pub require_email_verified: bool,

    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

/// A policy as persisted by the metadata store: principals as a
/// comma-separated list and the condition as JSON text.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRecord {
    pub id: i64,
    pub collection_id: String,
    pub name: String,
    pub action: String,
    pub effect: String,
    #[serde(default)]
    pub condition_json: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub allowed_principals: Option<String>,
    #[serde(default)]
    pub require_email_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Policy {
    /// Returns `true` if the policy applies to `principal`: its kind is
    /// listed and, for app users, the email requirement is met.
    pub fn applies_to(&self, principal: &Principal) -> bool {
        if !self.allowed_principals.contains(&principal.kind()) {
            return false;
        }

        match principal.kind() {
            PrincipalKind::AppUser => !self.require_email_verified || principal.is_email_verified(),
            _ => true,
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.condition.is_empty()
    }
}

impl TryFrom<PolicyRecord> for Policy {
    type Error = Error;

    fn try_from(record: PolicyRecord) -> Result<Policy> {
        let condition = match record.condition_json.as_deref().map(str::trim) {
            None | Some("") => Condition::default(),
            Some(src) => Condition::from_json_str(src)
                .map_err(|err| err.context(crate::err!("policy `{}`", record.name)))?,
        };

        let mut allowed_principals = record
            .allowed_principals
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(PrincipalKind::from_str)
            .collect::<Result<Vec<_>>>()?;

        if allowed_principals.is_empty() {
            allowed_principals = DEFAULT_ALLOWED_PRINCIPALS.to_vec();
        }

        Ok(Policy {
            id: record.id,
            collection_id: CollectionId(record.collection_id),
            name: record.name,
            action: record.action.parse()?,
            effect: record.effect.parse()?,
            condition,
            priority: record.priority,
            allowed_principals,
            require_email_verified: record.require_email_verified,
            is_active: record.is_active,
        })
    }
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Action> {
        Ok(match s {
            "create" => Action::Create,
            "read" => Action::Read,
            "update" => Action::Update,
            "delete" => Action::Delete,
            "list" => Action::List,
            _ => return Err(Error::invalid_definition(format!("unknown action `{s}`"))),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Effect> {
        match s {
            "allow" => Ok(Effect::Allow),
            "deny" => Ok(Effect::Deny),
            _ => Err(Error::invalid_definition(format!("unknown effect `{s}`"))),
        }
    }
}
