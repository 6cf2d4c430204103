//! Entry point resolution for build targets.
//!
//! Normalizes the `entry_point` of `pex_binary` targets and the `entry_points` of
//! `python_distribution` targets into module references, finds the targets owning those
//! modules, and injects them as inferred dependencies.

pub mod config;
pub mod core;
pub mod mapping;

pub use crate::config::InferSettings;
pub use crate::core::entry_point::{EntryPoint, ResolvedPexEntryPoint};
pub use crate::core::distribution::{DistributionEntryPoint, ResolvedDistributionEntryPoints};
pub use crate::core::error::{ResolveError, Result};
pub use crate::core::graph::{GraphEngine, Resolver};
pub use crate::core::inject::{
    InjectDependencies, InjectPexBinaryEntryPointDependency, InjectPythonDistributionDependencies,
    InjectorRegistry,
};
pub use crate::core::owners::ExplicitlyProvidedDependencies;
pub use crate::core::target::{DependenciesFieldKind, Target};
pub use crate::core::types::{Address, ModuleOwners};
