// explicitly declared dependencies + disambiguation of module owners
use indexmap::IndexSet;
use tracing::warn;

use crate::core::error::Result;
use crate::core::types::{Address, ModuleOwners};

/// The `dependencies` field of a target after address parsing.
///
/// `includes` are plain entries, `ignores` are entries prefixed with `!` (or `!!`) telling
/// inference to never add that address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitlyProvidedDependencies {
    pub address: Address,
    pub includes: IndexSet<Address>,
    pub ignores: IndexSet<Address>,
}

impl ExplicitlyProvidedDependencies {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            includes: IndexSet::new(),
            ignores: IndexSet::new(),
        }
    }

    pub fn parse(address: &Address, raw_dependencies: &[String]) -> Result<Self> {
        let mut deps = Self::new(address.clone());
        for raw in raw_dependencies {
            let raw = raw.trim();
            match raw.strip_prefix('!') {
                Some(ignored) => {
                    let ignored = ignored.strip_prefix('!').unwrap_or(ignored);
                    deps.ignores.insert(Address::parse(ignored, address)?);
                }
                None => {
                    deps.includes.insert(Address::parse(raw, address)?);
                }
            }
        }
        Ok(deps)
    }

    //owners declared from a file name must live at or above the declaring target
    fn eligible<'a>(
        &self,
        addresses: &'a IndexSet<Address>,
        owners_must_be_ancestors: bool,
    ) -> Vec<&'a Address> {
        addresses
            .iter()
            .filter(|addr| {
                !owners_must_be_ancestors || addr.is_ancestor_or_same_dir_of(&self.address)
            })
            .collect()
    }

    /// Pick one owner out of `ambiguous`, if the declared dependencies make the choice.
    ///
    /// Exactly one candidate explicitly included wins. Otherwise ignores are subtracted and a
    /// single survivor wins.
    pub fn disambiguated(
        &self,
        ambiguous: &IndexSet<Address>,
        owners_must_be_ancestors: bool,
    ) -> Option<Address> {
        let candidates = self.eligible(ambiguous, owners_must_be_ancestors);
        if candidates.is_empty() {
            return None;
        }

        let included: Vec<&Address> = candidates
            .iter()
            .copied()
            .filter(|addr| self.includes.contains(*addr))
            .collect();
        match included.as_slice() {
            [only] => return Some((*only).clone()),
            [] => {}
            _ => return None,
        }

        let remaining: Vec<&Address> = candidates
            .into_iter()
            .filter(|addr| !self.ignores.contains(*addr))
            .collect();
        match remaining.as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }

    /// The warning for an ambiguity the declared dependencies do not settle, if any.
    pub fn ambiguity_warning(
        &self,
        ambiguous: &IndexSet<Address>,
        owners_must_be_ancestors: bool,
        import_reference: &str,
        context: &str,
    ) -> Option<String> {
        let candidates = self.eligible(ambiguous, owners_must_be_ancestors);
        if candidates.is_empty() {
            return None;
        }
        //several explicit includes: the edges exist already, nothing to ask of the user
        if candidates.iter().any(|addr| self.includes.contains(*addr)) {
            return None;
        }

        let mut remaining: Vec<String> = candidates
            .into_iter()
            .filter(|addr| !self.ignores.contains(*addr))
            .map(Address::spec)
            .collect();
        if remaining.len() <= 1 {
            return None;
        }
        remaining.sort();

        Some(format!(
            "{context}, but the owner cannot be safely inferred because more than one target \
             owns this {import_reference}, so it is ambiguous which to use: {remaining:?}.\n\n\
             Please explicitly include the dependency you want in the `dependencies` field of \
             {address}, or ignore the ones you do not want by prefixing with `!` or `!!` so that \
             one or no targets are left.\n\nAlternatively, you can remove the ambiguity by \
             deleting/changing some of the targets so that only 1 target owns this \
             {import_reference}.",
            address = self.address,
        ))
    }

    pub fn maybe_warn_of_ambiguous_dependency_inference(
        &self,
        ambiguous: &IndexSet<Address>,
        owners_must_be_ancestors: bool,
        import_reference: &str,
        context: &str,
    ) {
        if let Some(message) =
            self.ambiguity_warning(ambiguous, owners_must_be_ancestors, import_reference, context)
        {
            warn!(target_address = %self.address, "{message}");
        }
    }

    /// Owners to inject for one module lookup: the unambiguous owners plus the disambiguated
    /// one, if any. Warns when the ambiguity stays unresolved.
    pub fn inferred_owners(
        &self,
        owners: &ModuleOwners,
        owners_must_be_ancestors: bool,
        context: &str,
    ) -> IndexSet<Address> {
        self.maybe_warn_of_ambiguous_dependency_inference(
            &owners.ambiguous,
            owners_must_be_ancestors,
            "module",
            context,
        );

        let mut result: IndexSet<Address> = self
            .eligible(&owners.unambiguous, owners_must_be_ancestors)
            .into_iter()
            .cloned()
            .collect();
        if let Some(disambiguated) =
            self.disambiguated(&owners.ambiguous, owners_must_be_ancestors)
        {
            result.insert(disambiguated);
        }
        result
    }
}
