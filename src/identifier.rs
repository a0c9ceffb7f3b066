//! Namespaced identifiers of the form `namespace:path`.
//!
//! A bare `path` (no colon) is placed in [`DEFAULT_NAMESPACE`].  The
//! namespace may contain `[a-z0-9_.-]`; the path additionally allows `/`.
//! Display always yields the fully qualified `namespace:path` form, so a
//! written identifier parses back to itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace assumed when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Identifier '{0}' has an empty path")]
    EmptyPath(String),
    #[error("Identifier '{id}' has invalid character '{ch}' in its namespace")]
    BadNamespace { id: String, ch: char },
    #[error("Identifier '{id}' has invalid character '{ch}' in its path")]
    BadPath { id: String, ch: char },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    namespace: String,
    path:      String,
}

impl Identifier {
    /// Build an identifier from its two halves, validating both.
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {
        let display = format!("{namespace}:{path}");
        if path.is_empty() {
            return Err(IdentifierError::EmptyPath(display));
        }
        if let Some(ch) = namespace.chars().find(|c| !valid_namespace_char(*c)) {
            return Err(IdentifierError::BadNamespace { id: display, ch });
        }
        if let Some(ch) = path.chars().find(|c| !valid_path_char(*c)) {
            return Err(IdentifierError::BadPath { id: display, ch });
        }
        Ok(Self { namespace: namespace.to_owned(), path: path.to_owned() })
    }

    /// Parse `namespace:path` or a bare `path`.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        match s.split_once(':') {
            Some((ns, path)) if ns.is_empty() => Self::new(DEFAULT_NAMESPACE, path),
            Some((ns, path))                  => Self::new(ns, path),
            None                              => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

    pub fn namespace(&self) -> &str { &self.namespace }
    pub fn path(&self) -> &str { &self.path }
}

fn valid_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn valid_path_char(c: char) -> bool {
    valid_namespace_char(c) || c == '/'
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Identifier::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bare_path_gets_default_namespace() {
        let id = Identifier::parse("stone").unwrap();
        assert_eq!(id.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(id.to_string(), "minecraft:stone");
    }

    #[test]
    fn path_may_contain_slashes() {
        let id = Identifier::parse("mymod:textures/block/ore").unwrap();
        assert_eq!(id.namespace(), "mymod");
        assert_eq!(id.path(), "textures/block/ore");
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(matches!(
            Identifier::parse("My Mod:thing"),
            Err(IdentifierError::BadNamespace { ch: 'M', .. })
        ));
        assert!(matches!(
            Identifier::parse("mymod:Thing"),
            Err(IdentifierError::BadPath { ch: 'T', .. })
        ));
        assert!(matches!(Identifier::parse("mymod:"), Err(IdentifierError::EmptyPath(_))));
        assert!(Identifier::parse("a:b:c").is_err());
    }

    #[test]
    fn serde_uses_display_form() {
        let id = Identifier::parse("stone").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"minecraft:stone\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn display_parses_back(ns in "[a-z0-9_.-]{1,12}", path in "[a-z0-9_.-][a-z0-9_./-]{0,20}") {
            let id = Identifier::new(&ns, &path).unwrap();
            prop_assert_eq!(Identifier::parse(&id.to_string()).unwrap(), id);
        }
    }
}
