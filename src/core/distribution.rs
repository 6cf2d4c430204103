// resolution of `python_distribution` entry points
use std::collections::HashMap;

use futures::future::try_join_all;
use indexmap::IndexMap;
use tracing::warn;

use crate::core::classify::classify_entry_points;
use crate::core::entry_point::{EntryPoint, ResolvedPexEntryPoint};
use crate::core::error::{ResolveError, Result};
use crate::core::graph::Resolver;
use crate::core::target::{ENTRY_POINTS_FIELD, PythonDistributionEntryPointsField};
use crate::core::types::Address;

/// Categories whose entries are invoked as functions, so they need the `:func` part.
pub const CALLABLE_CATEGORIES: [&str; 2] = ["console_scripts", "gui_scripts"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionEntryPoint {
    pub entry_point: EntryPoint,
    /// Set when the entry point was declared through a `pex_binary` reference.
    pub pex_binary_address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDistributionEntryPoints {
    pub val: IndexMap<String, IndexMap<String, DistributionEntryPoint>>,
}

impl ResolvedDistributionEntryPoints {
    /// Entries declared as literal modules, grouped like the field.
    pub fn explicit_modules(&self) -> IndexMap<String, IndexMap<String, EntryPoint>> {
        self.val
            .iter()
            .filter_map(|(category, entries)| {
                let modules: IndexMap<String, EntryPoint> = entries
                    .iter()
                    .filter(|(_, ep)| ep.pex_binary_address.is_none())
                    .map(|(name, ep)| (name.clone(), ep.entry_point.clone()))
                    .collect();
                (!modules.is_empty()).then(|| (category.clone(), modules))
            })
            .collect()
    }

    /// Every `pex_binary` referenced from the field, in declaration order.
    pub fn pex_binary_addresses(&self) -> Vec<Address> {
        self.val
            .values()
            .flat_map(|entries| entries.values())
            .filter_map(|ep| ep.pex_binary_address.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }
}

impl Resolver {
    /// Resolve an `entry_points` field.
    ///
    /// Target references are resolved in one batch and replaced by the entry point of the
    /// `pex_binary` they point at; literal specs are parsed as is. Callable categories are
    /// checked for a function afterwards.
    pub async fn resolve_distribution_entry_points(
        &self,
        field: &PythonDistributionEntryPointsField,
    ) -> Result<ResolvedDistributionEntryPoints> {
        let Some(field_value) = &field.value else {
            return Ok(ResolvedDistributionEntryPoints::default());
        };
        let address = &field.address;
        let classified = classify_entry_points(field_value);

        //pick out every target ref up front so they resolve as one batch
        let target_refs: Vec<String> = classified
            .iter()
            .filter(|c| c.is_target)
            .map(|c| c.spec.clone())
            .collect();

        //addresses are not deduplicated, targets may be: go through addresses to keep one per ref
        let target_addresses = self.engine().resolve_addresses(&target_refs, address).await?;
        let address_by_ref: HashMap<&str, &Address> = target_refs
            .iter()
            .map(String::as_str)
            .zip(target_addresses.iter())
            .collect();
        let targets = self.engine().lookup_targets(&target_addresses).await?;

        let mut fields = Vec::with_capacity(targets.len());
        for target in &targets {
            let Some(entry_point_field) = target.pex_entry_point_field() else {
                return Err(ResolveError::invalid_field(
                    address,
                    ENTRY_POINTS_FIELD,
                    format!(
                        "All target addresses in the entry_points field must be for pex_binary \
                         targets, but the target {address} includes the value {}, which has the \
                         target type {}.\n\nAlternatively, you can use a module like \
                         \"project.app:main\".",
                        target.address, target.alias
                    ),
                ));
            };
            fields.push(entry_point_field);
        }

        let binary_entry_points =
            try_join_all(fields.iter().map(|f| self.resolve_pex_entry_point(f))).await?;
        let binary_entry_point_by_address: HashMap<&Address, &ResolvedPexEntryPoint> = targets
            .iter()
            .map(|t| &t.address)
            .zip(binary_entry_points.iter())
            .collect();

        let mut entry_points: IndexMap<String, IndexMap<String, DistributionEntryPoint>> =
            IndexMap::new();

        for c in &classified {
            let (entry_point, owner) = if c.is_target {
                let owner = lookup(&address_by_ref, c.spec.as_str(), address)?;
                let resolved = lookup(&binary_entry_point_by_address, owner, address)?;
                match &resolved.val {
                    Some(ep) => (ep.clone(), Some(owner.clone())),
                    None => {
                        warn!(
                            "The entry point {} in {} references a pex binary {}, which has set \
                             its entry point to '<none>'. Skipping this entry because '<none>' is \
                             not valid as an entry point.",
                            c.name, c.category, c.spec
                        );
                        continue;
                    }
                }
            } else {
                let provenance = format!("{} for {address} {}", c.name, c.category);
                let ep = EntryPoint::parse(&c.spec, Some(provenance.as_str()))
                    .map_err(|e| ResolveError::invalid_field(address, ENTRY_POINTS_FIELD, e.0))?;
                (ep, None)
            };

            if CALLABLE_CATEGORIES.contains(&c.category.as_str())
                && entry_point.function.is_none()
            {
                return Err(ResolveError::InvalidEntryPoint {
                    category: c.category.clone(),
                    name: c.name.clone(),
                    address: address.clone(),
                    spec: entry_point.spec(),
                    module: entry_point.module.clone(),
                });
            }

            entry_points.entry(c.category.clone()).or_default().insert(
                c.name.clone(),
                DistributionEntryPoint {
                    entry_point,
                    pex_binary_address: owner,
                },
            );
        }

        Ok(ResolvedDistributionEntryPoints { val: entry_points })
    }
}

//the maps are built from the engine's own answers, so a miss means the engine broke its contract
fn lookup<'a, K, V>(map: &HashMap<K, &'a V>, key: K, address: &Address) -> Result<&'a V>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
{
    let missing = format!("{key:?}");
    map.get(&key).copied().ok_or_else(|| {
        ResolveError::invalid_field(
            address,
            ENTRY_POINTS_FIELD,
            format!("the build graph returned no target for {missing}"),
        )
    })
}
