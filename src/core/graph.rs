// collaborators the resolver talks to
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::owners::ExplicitlyProvidedDependencies;
use crate::core::target::Target;
use crate::core::types::{Address, ModuleOwners};

/// A filesystem glob request. `description_of_origin` ends up in the error raised when
/// nothing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGlobs {
    pub globs: Vec<String>,
    pub description_of_origin: String,
}

impl PathGlobs {
    pub fn new(globs: Vec<String>, description_of_origin: impl Into<String>) -> Self {
        Self {
            globs,
            description_of_origin: description_of_origin.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paths {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    pub path: String,
}

/// The build-graph engine as seen from entry point resolution.
///
/// Every method is a read-only lookup; the engine owns memoization, retries and timeouts.
/// Errors returned here abort the resolution of the target that issued the request.
#[async_trait]
pub trait GraphEngine: Send + Sync {
    /// Expand the globs, failing with `NoMatchingFiles` when a glob matches nothing.
    async fn resolve_paths(&self, globs: &PathGlobs) -> Result<Paths>;

    async fn source_root_for_file(&self, path: &str) -> Result<SourceRoot>;

    /// Order-preserving and not deduplicated: `result[i]` belongs to `refs[i]`.
    async fn resolve_addresses(&self, refs: &[String], owning_address: &Address)
        -> Result<Vec<Address>>;

    /// May deduplicate, so callers must key results by `Target::address`.
    async fn lookup_targets(&self, addresses: &[Address]) -> Result<Vec<Target>>;

    async fn module_owners(&self, module: &str) -> Result<ModuleOwners>;

    async fn explicit_dependencies(
        &self,
        target: &Target,
    ) -> Result<ExplicitlyProvidedDependencies>;
}

/// Entry point resolution over a [`GraphEngine`].
///
/// Stateless apart from the engine handle: every call builds its intermediate maps locally,
/// so one resolver can serve many targets concurrently.
#[derive(Clone)]
pub struct Resolver {
    engine: Arc<dyn GraphEngine>,
}

impl Resolver {
    pub fn new(engine: Arc<dyn GraphEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &dyn GraphEngine {
        self.engine.as_ref()
    }
}
