use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The authenticated (or anonymous) caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A member of the project's administrative team.
    AdminUser {
        user_id: String,
        email: Option<String>,
    },

    /// An end user of the project's application.
    AppUser {
        app_user_id: String,
        email: Option<String>,
        email_verified: bool,
    },

    /// A programmatic client. Keys are created by an admin user, who is
    /// recorded as the owner.
    ApiKey {
        key_id: String,
        owner_user_id: Option<String>,
    },

    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    AdminUser,
    AppUser,
    ApiKey,
    Anonymous,
}

impl Principal {
    pub fn admin_user(user_id: impl Into<String>) -> Principal {
        Principal::AdminUser {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn app_user(app_user_id: impl Into<String>, email_verified: bool) -> Principal {
        Principal::AppUser {
            app_user_id: app_user_id.into(),
            email: None,
            email_verified,
        }
    }

    /// Sets the email of an admin or app user. Other principals have none.
    pub fn with_email(mut self, address: impl Into<String>) -> Principal {
        if let Principal::AdminUser { email, .. } | Principal::AppUser { email, .. } = &mut self {
            *email = Some(address.into());
        }
        self
    }

    pub fn api_key(key_id: impl Into<String>, owner_user_id: Option<String>) -> Principal {
        Principal::ApiKey {
            key_id: key_id.into(),
            owner_user_id,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::AdminUser { .. } => PrincipalKind::AdminUser,
            Principal::AppUser { .. } => PrincipalKind::AppUser,
            Principal::ApiKey { .. } => PrincipalKind::ApiKey,
            Principal::Anonymous => PrincipalKind::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Principal::Anonymous)
    }

    /// Only app users carry a verification flag; every other principal is
    /// treated as unverified.
    pub fn is_email_verified(&self) -> bool {
        matches!(
            self,
            Principal::AppUser {
                email_verified: true,
                ..
            }
        )
    }

    /// Value substituted for `$current_user_id`.
    pub fn current_user_id(&self) -> Option<&str> {
        match self {
            Principal::AdminUser { user_id, .. } => Some(user_id),
            Principal::AppUser { app_user_id, .. } => Some(app_user_id),
            Principal::ApiKey { owner_user_id, .. } => owner_user_id.as_deref(),
            Principal::Anonymous => None,
        }
    }

    /// Value substituted for `$current_email`.
    pub fn current_email(&self) -> Option<&str> {
        match self {
            Principal::AdminUser { email, .. } | Principal::AppUser { email, .. } => {
                email.as_deref()
            }
            _ => None,
        }
    }

    /// Value substituted for `$current_app_user_id`.
    pub fn current_app_user_id(&self) -> Option<&str> {
        match self {
            Principal::AppUser { app_user_id, .. } => Some(app_user_id),
            _ => None,
        }
    }
}

impl PrincipalKind {
    pub const ALL: [PrincipalKind; 4] = [
        PrincipalKind::AdminUser,
        PrincipalKind::AppUser,
        PrincipalKind::ApiKey,
        PrincipalKind::Anonymous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrincipalKind::AdminUser => "admin_user",
            PrincipalKind::AppUser => "app_user",
            PrincipalKind::ApiKey => "api_key",
            PrincipalKind::Anonymous => "anonymous",
        }
    }
}

impl FromStr for PrincipalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<PrincipalKind> {
        PrincipalKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::invalid_definition(format!("unknown principal kind `{s}`")))
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
