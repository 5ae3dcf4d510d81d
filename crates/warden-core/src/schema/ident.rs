use crate::{Error, Result};

use std::{fmt, sync::Arc};

/// Longest identifier accepted. Matches PostgreSQL's `NAMEDATALEN - 1`.
const MAX_LEN: usize = 63;

/// A physical table, column or namespace name.
///
/// An `Ident` can only be created through [`Ident::new`], which accepts
/// `[A-Za-z_][A-Za-z0-9_]*` up to 63 bytes. Every identifier that reaches a
/// SQL serializer is therefore known to be free of quotes, whitespace and
/// punctuation, independently of the quoting the serializer applies.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(Arc<str>);

impl Ident {
    pub fn new(name: &str) -> Result<Ident> {
        if !Ident::is_valid(name) {
            return Err(Error::invalid_schema(format!(
                "`{name}` is not a valid identifier"
            )));
        }

        Ok(Ident(name.into()))
    }

    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();

        let Some(first) = chars.next() else {
            return false;
        };

        name.len() <= MAX_LEN
            && (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({})", self.0)
    }
}
