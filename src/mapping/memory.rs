// in-memory build graph over WorkspaceFacts
use std::collections::BTreeSet;

use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use indexmap::{IndexMap, IndexSet};

use crate::core::error::{ResolveError, Result};
use crate::core::graph::{GraphEngine, PathGlobs, Paths, SourceRoot};
use crate::core::owners::ExplicitlyProvidedDependencies;
use crate::core::target::Target;
use crate::core::types::{Address, ModuleOwners};
use crate::mapping::facts::WorkspaceFacts;
use crate::mapping::generator::ModuleOwnerIndex;

//`*` stays within one directory, `**` crosses them
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A [`GraphEngine`] answering from a fixed set of facts. The module index is generated
/// once, up front.
pub struct MemoryGraph {
    facts: WorkspaceFacts,
    index: ModuleOwnerIndex,
    targets: IndexMap<Address, Target>,
}

impl MemoryGraph {
    pub fn new(facts: WorkspaceFacts) -> Self {
        let index = ModuleOwnerIndex::generate(&facts);
        let targets = facts
            .targets
            .iter()
            .map(|t| (t.address.clone(), t.clone()))
            .collect();
        Self {
            facts,
            index,
            targets,
        }
    }

    fn existing(&self, address: Address) -> Result<Address> {
        if self.targets.contains_key(&address) {
            Ok(address)
        } else {
            Err(ResolveError::UnknownTarget(address))
        }
    }
}

#[async_trait]
impl GraphEngine for MemoryGraph {
    async fn resolve_paths(&self, globs: &PathGlobs) -> Result<Paths> {
        let mut files = BTreeSet::new();
        for glob in &globs.globs {
            let pattern = Pattern::new(glob).map_err(|e| ResolveError::InvalidGlob {
                glob: glob.clone(),
                origin: globs.description_of_origin.clone(),
                reason: e.to_string(),
            })?;
            let matched: Vec<&String> = self
                .facts
                .files
                .iter()
                .filter(|f| pattern.matches_with(f, MATCH_OPTIONS))
                .collect();
            if matched.is_empty() {
                return Err(ResolveError::NoMatchingFiles {
                    glob: glob.clone(),
                    origin: globs.description_of_origin.clone(),
                });
            }
            files.extend(matched.into_iter().cloned());
        }
        Ok(Paths {
            files: files.into_iter().collect(),
        })
    }

    async fn source_root_for_file(&self, path: &str) -> Result<SourceRoot> {
        self.facts
            .source_root_for(path)
            .map(|root| SourceRoot {
                path: root.to_string(),
            })
            .ok_or_else(|| ResolveError::NoSourceRoot {
                path: path.to_string(),
            })
    }

    async fn resolve_addresses(
        &self,
        refs: &[String],
        owning_address: &Address,
    ) -> Result<Vec<Address>> {
        refs.iter()
            .map(|raw| self.existing(Address::parse(raw, owning_address)?))
            .collect()
    }

    async fn lookup_targets(&self, addresses: &[Address]) -> Result<Vec<Target>> {
        let unique: IndexSet<&Address> = addresses.iter().collect();
        unique
            .into_iter()
            .map(|address| {
                self.targets
                    .get(address)
                    .cloned()
                    .ok_or_else(|| ResolveError::UnknownTarget(address.clone()))
            })
            .collect()
    }

    async fn module_owners(&self, module: &str) -> Result<ModuleOwners> {
        Ok(self.index.owners(module))
    }

    async fn explicit_dependencies(
        &self,
        target: &Target,
    ) -> Result<ExplicitlyProvidedDependencies> {
        ExplicitlyProvidedDependencies::parse(&target.address, &target.dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> MemoryGraph {
        let facts = WorkspaceFacts::new(
            &["app/main.py", "app/util.py", "app/sub/deep.py"],
            &["."],
            vec![
                Target::pex_binary(Address::new("app", "bin"), "main.py").unwrap(),
                Target::python_sources(Address::new("app", "lib"), &["main.py", "util.py"]),
            ],
        );
        MemoryGraph::new(facts)
    }

    fn globs(glob: &str) -> PathGlobs {
        PathGlobs::new(vec![glob.to_string()], "a test")
    }

    #[tokio::test]
    async fn single_star_stays_in_directory() {
        let paths = graph().resolve_paths(&globs("app/*.py")).await.unwrap();
        assert_eq!(paths.files, vec!["app/main.py", "app/util.py"]);

        let deep = graph().resolve_paths(&globs("app/**/*.py")).await.unwrap();
        assert!(deep.files.contains(&"app/sub/deep.py".to_string()));
    }

    #[tokio::test]
    async fn unmatched_glob_carries_origin() {
        let err = graph().resolve_paths(&globs("app/nope.py")).await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoMatchingFiles {
                glob: "app/nope.py".to_string(),
                origin: "a test".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn addresses_keep_order_and_duplicates() {
        let g = graph();
        let owner = Address::new("app", "bin");
        let refs = vec![":lib".to_string(), "app:bin".to_string(), "//app:lib".to_string()];

        let resolved = g.resolve_addresses(&refs, &owner).await.unwrap();
        assert_eq!(
            resolved,
            vec![Address::new("app", "lib"), Address::new("app", "bin"), Address::new("app", "lib")]
        );

        let targets = g.lookup_targets(&resolved).await.unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[tokio::test]
    async fn unknown_address_is_an_error() {
        let g = graph();
        let err = g
            .resolve_addresses(&[":missing".to_string()], &Address::new("app", "bin"))
            .await
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownTarget(Address::new("app", "missing")));
    }

    #[tokio::test]
    async fn source_roots_are_looked_up_per_file() {
        let g = graph();
        assert_eq!(g.source_root_for_file("app/main.py").await.unwrap().path, ".");

        let rootless = MemoryGraph::new(WorkspaceFacts::new(&["x.py"], &["src"], Vec::new()));
        assert!(matches!(
            rootless.source_root_for_file("x.py").await,
            Err(ResolveError::NoSourceRoot { .. })
        ));
    }
}
