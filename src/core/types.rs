// addresses + module ownership
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{ResolveError, Result};

/// Identifies one target in the build graph: the directory holding its declaration
/// (`spec_path`) plus its name within that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    pub spec_path: String,
    pub target_name: String,
}

impl Address {
    pub fn new(spec_path: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            spec_path: spec_path.into(),
            target_name: target_name.into(),
        }
    }

    /// Parse a raw reference the way users write them in `dependencies` or `entry_points`.
    ///
    /// Accepted forms:
    /// - `:name` => a sibling of `relative_to`
    /// - `path/to:name` or `//path/to:name`
    /// - `path/to` => name defaults to the last path component
    pub fn parse(raw: &str, relative_to: &Address) -> Result<Address> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ResolveError::InvalidAddress {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("the address is empty"));
        }

        if let Some(name) = trimmed.strip_prefix(':') {
            if name.is_empty() {
                return Err(invalid("no target name after `:`"));
            }
            if name.contains(':') {
                return Err(invalid("more than one `:`"));
            }
            return Ok(Address::new(relative_to.spec_path.clone(), name));
        }

        let without_root = trimmed.strip_prefix("//").unwrap_or(trimmed);
        let (path, name) = match without_root.split_once(':') {
            Some((path, name)) => {
                if name.is_empty() {
                    return Err(invalid("no target name after `:`"));
                }
                if name.contains(':') {
                    return Err(invalid("more than one `:`"));
                }
                (path.trim_end_matches('/'), name.to_string())
            }
            None => {
                let path = without_root.trim_end_matches('/');
                //name defaults to the directory name
                let name = path.rsplit('/').next().unwrap_or_default();
                if name.is_empty() {
                    return Err(invalid("a root-level address needs an explicit target name"));
                }
                (path, name.to_string())
            }
        };

        Ok(Address::new(path, name))
    }

    /// `true` if this address is declared in the same directory as `other`, or in one of its
    /// parent directories.
    pub fn is_ancestor_or_same_dir_of(&self, other: &Address) -> bool {
        if self.spec_path.is_empty() || self.spec_path == other.spec_path {
            return true;
        }
        other
            .spec_path
            .strip_prefix(self.spec_path.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn spec(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.spec_path, self.target_name)
    }
}

/// The targets that provide an importable module.
///
/// `unambiguous` holds the owner when exactly one target provides the module; when several do,
/// all of them land in `ambiguous` and it is up to the caller to pick one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOwners {
    pub unambiguous: IndexSet<Address>,
    pub ambiguous: IndexSet<Address>,
}

impl ModuleOwners {
    pub fn unambiguous(owners: impl IntoIterator<Item = Address>) -> Self {
        Self {
            unambiguous: owners.into_iter().collect(),
            ambiguous: IndexSet::new(),
        }
    }

    pub fn ambiguous(owners: impl IntoIterator<Item = Address>) -> Self {
        Self {
            unambiguous: IndexSet::new(),
            ambiguous: owners.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unambiguous.is_empty() && self.ambiguous.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin() -> Address {
        Address::new("src/app", "bin")
    }

    #[test]
    fn parse_relative_and_absolute_forms() {
        assert_eq!(Address::parse(":lib", &bin()).unwrap(), Address::new("src/app", "lib"));
        assert_eq!(
            Address::parse("src/util:helpers", &bin()).unwrap(),
            Address::new("src/util", "helpers")
        );
        assert_eq!(
            Address::parse("//src/util:helpers", &bin()).unwrap(),
            Address::new("src/util", "helpers")
        );
        assert_eq!(Address::parse("//:root", &bin()).unwrap(), Address::new("", "root"));
    }

    #[test]
    fn parse_defaults_name_to_directory() {
        assert_eq!(
            Address::parse("src/util/", &bin()).unwrap(),
            Address::new("src/util", "util")
        );
    }

    #[test]
    fn parse_rejects_malformed_refs() {
        for raw in ["", "   ", ":", "src/util:", "a:b:c", "//"] {
            let err = Address::parse(raw, &bin()).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidAddress { .. }),
                "expected InvalidAddress for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn ancestor_check_respects_directory_boundaries() {
        let target = Address::new("src/app/cli", "bin");

        assert!(Address::new("", "root").is_ancestor_or_same_dir_of(&target));
        assert!(Address::new("src", "lib").is_ancestor_or_same_dir_of(&target));
        assert!(Address::new("src/app/cli", "lib").is_ancestor_or_same_dir_of(&target));

        //sibling prefix is not a parent directory
        assert!(!Address::new("src/ap", "lib").is_ancestor_or_same_dir_of(&target));
        assert!(!Address::new("src/app/cli/sub", "lib").is_ancestor_or_same_dir_of(&target));
    }

    #[test]
    fn display_uses_double_slash_prefix() {
        assert_eq!(bin().to_string(), "//src/app:bin");
        assert_eq!(Address::new("", "root").spec(), "//:root");
    }
}
