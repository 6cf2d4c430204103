// dependency injection from entry points
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use indexmap::IndexSet;
use tracing::debug;

use crate::config::InferSettings;
use crate::core::error::{ResolveError, Result};
use crate::core::graph::Resolver;
use crate::core::target::{DependenciesFieldKind, ENTRY_POINT_FIELD, Target};
use crate::core::types::Address;

/// Infers extra dependencies for targets carrying one kind of `dependencies` field.
#[async_trait]
pub trait InjectDependencies: Send + Sync {
    fn inject_for(&self) -> DependenciesFieldKind;

    async fn inject(&self, target: &Target) -> Result<IndexSet<Address>>;
}

/// Infers the owner of the module a `pex_binary` runs.
pub struct InjectPexBinaryEntryPointDependency {
    resolver: Resolver,
    settings: InferSettings,
}

impl InjectPexBinaryEntryPointDependency {
    pub fn new(resolver: Resolver, settings: InferSettings) -> Self {
        Self { resolver, settings }
    }
}

#[async_trait]
impl InjectDependencies for InjectPexBinaryEntryPointDependency {
    fn inject_for(&self) -> DependenciesFieldKind {
        DependenciesFieldKind::PexBinary
    }

    async fn inject(&self, target: &Target) -> Result<IndexSet<Address>> {
        if !self.settings.entry_points {
            return Ok(IndexSet::new());
        }
        let address = &target.address;
        let field = target.pex_entry_point_field().ok_or_else(|| {
            ResolveError::invalid_field(
                address,
                ENTRY_POINT_FIELD,
                format!("the target type {} has no `{ENTRY_POINT_FIELD}` field", target.alias),
            )
        })?;

        let engine = self.resolver.engine();
        let (explicitly_provided_deps, entry_point) = futures::try_join!(
            engine.explicit_dependencies(target),
            self.resolver.resolve_pex_entry_point(&field),
        )?;

        let Some(val) = entry_point.val else {
            return Ok(IndexSet::new());
        };

        let owners = engine.module_owners(&val.module).await?;
        let context = format!(
            "The pex_binary target {address} has the field `entry_point={:?}`, which maps to the \
             Python module `{}`",
            field.value.spec(),
            val.module
        );

        //owners of a file name must sit in the binary's directory or one of its parents
        let inferred =
            explicitly_provided_deps.inferred_owners(&owners, entry_point.file_name_used, &context);
        debug!(target = %address, count = inferred.len(), "inferred entry point dependencies");
        Ok(inferred)
    }
}

/// Infers dependencies of a `python_distribution` from its `entry_points` and `provides`
/// fields.
pub struct InjectPythonDistributionDependencies {
    resolver: Resolver,
    settings: InferSettings,
}

impl InjectPythonDistributionDependencies {
    pub fn new(resolver: Resolver, settings: InferSettings) -> Self {
        Self { resolver, settings }
    }
}

#[async_trait]
impl InjectDependencies for InjectPythonDistributionDependencies {
    fn inject_for(&self) -> DependenciesFieldKind {
        DependenciesFieldKind::PythonDistribution
    }

    async fn inject(&self, target: &Target) -> Result<IndexSet<Address>> {
        if !self.settings.entry_points {
            return Ok(IndexSet::new());
        }
        let address = &target.address;
        let engine = self.resolver.engine();

        let entry_points_field = target.entry_points_field();
        let (explicitly_provided_deps, all_entry_points) = futures::try_join!(
            engine.explicit_dependencies(target),
            self.resolver.resolve_distribution_entry_points(&entry_points_field),
        )?;

        //one lookup per entry, each keeps its own context for warnings
        let all_module_entry_points: Vec<(String, String, _)> = all_entry_points
            .explicit_modules()
            .into_iter()
            .flat_map(|(category, entries)| {
                entries
                    .into_iter()
                    .map(move |(name, entry_point)| (category.clone(), name, entry_point))
            })
            .collect();
        let all_module_owners = try_join_all(
            all_module_entry_points
                .iter()
                .map(|(_, _, entry_point)| engine.module_owners(&entry_point.module)),
        )
        .await?;

        let mut module_owners: IndexSet<Address> = IndexSet::new();
        for ((category, name, entry_point), owners) in
            all_module_entry_points.iter().zip(all_module_owners.iter())
        {
            let context = format!(
                "The python_distribution target {address} has the field \
                 `entry_points={{{category:?}: {{{name:?}: {:?}}}}}`, which maps to the Python \
                 module `{}`",
                entry_point.spec(),
                entry_point.module
            );
            module_owners.extend(explicitly_provided_deps.inferred_owners(owners, false, &context));
        }

        //only resolved here, `provides` validation belongs to packaging
        let with_binaries = target.provided_binaries();
        let with_binaries_addresses = if with_binaries.is_empty() {
            Vec::new()
        } else {
            engine.resolve_addresses(&with_binaries, address).await?
        };

        let mut inferred = module_owners;
        inferred.extend(with_binaries_addresses);
        inferred.extend(all_entry_points.pex_binary_addresses());
        debug!(target = %address, count = inferred.len(), "inferred distribution dependencies");
        Ok(inferred)
    }
}

/// Maps each dependencies field kind to the injector for it.
#[derive(Default, Clone)]
pub struct InjectorRegistry {
    injectors: HashMap<DependenciesFieldKind, Arc<dyn InjectDependencies>>,
}

impl InjectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with both entry point injectors registered.
    pub fn with_entry_point_injectors(resolver: Resolver, settings: InferSettings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InjectPexBinaryEntryPointDependency::new(
            resolver.clone(),
            settings,
        )));
        registry.register(Arc::new(InjectPythonDistributionDependencies::new(
            resolver, settings,
        )));
        registry
    }

    /// Returns the injector previously registered for the same kind, if any.
    pub fn register(
        &mut self,
        injector: Arc<dyn InjectDependencies>,
    ) -> Option<Arc<dyn InjectDependencies>> {
        self.injectors.insert(injector.inject_for(), injector)
    }

    pub fn get(&self, kind: DependenciesFieldKind) -> Option<&Arc<dyn InjectDependencies>> {
        self.injectors.get(&kind)
    }

    /// Injected dependencies for `target`; empty when nothing is registered for its field kind.
    pub async fn inject(&self, target: &Target) -> Result<IndexSet<Address>> {
        match self.get(target.dependencies_field_kind()) {
            Some(injector) => injector.inject(target).await,
            None => Ok(IndexSet::new()),
        }
    }

    /// Run every target independently: a failure only shows up in that target's slot.
    pub async fn inject_all(&self, targets: &[Target]) -> Vec<Result<IndexSet<Address>>> {
        join_all(targets.iter().map(|t| self.inject(t))).await
    }
}
