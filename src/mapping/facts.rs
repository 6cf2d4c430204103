// workspace facts: the files, source roots and targets an in-memory graph is built from
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::entry_point::join_spec_path;
use crate::core::target::Target;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFacts {
    #[serde(default)]
    pub source_roots: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl WorkspaceFacts {
    pub fn new(files: &[&str], source_roots: &[&str], targets: Vec<Target>) -> Self {
        Self {
            source_roots: source_roots.iter().map(|s| s.to_string()).collect(),
            files: files.iter().map(|s| s.to_string()).collect(),
            targets,
        }
    }

    /// Decode a `facts.toon` document.
    pub fn from_toon(input: &str) -> Result<Self, ConfigError> {
        toon_format::decode_default(input).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    pub fn to_toon(&self) -> Result<String, ConfigError> {
        toon_format::encode_default(self).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    /// The most specific source root containing `path`. `.` and the empty string are the
    /// workspace root.
    pub fn source_root_for(&self, path: &str) -> Option<&str> {
        self.source_roots
            .iter()
            .map(String::as_str)
            .filter(|root| match *root {
                "" | "." => true,
                root => path
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/')),
            })
            .max_by_key(|root| match *root {
                "." => 0,
                root => root.len(),
            })
    }

    /// Workspace-relative paths of the files `target` lists in `sources`.
    pub fn owned_files(target: &Target) -> Vec<String> {
        target
            .sources
            .iter()
            .filter_map(|source| normalize_path(&join_spec_path(&target.address.spec_path, source)))
            .collect()
    }
}

//resolves `.` and `..`; `None` if the path escapes the workspace
fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    Some(parts.join("/"))
}
