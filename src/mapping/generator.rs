/*
Inputs:

    WorkspaceFacts (targets + the files they list in `sources`, source roots)

Outputs:

    module -> owning targets

Responsibilities:

    Normalize identities (file path -> dotted module, package `__init__` -> package)

    One owner => unambiguous, several => ambiguous, the caller disambiguates

    Stable, reproducible results: owners keep target declaration order
*/
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::core::entry_point::{SOURCE_FILE_SUFFIX, module_for_path};
use crate::core::types::{Address, ModuleOwners};
use crate::mapping::facts::WorkspaceFacts;

const PACKAGE_INIT: &str = "__init__";

#[derive(Debug, Clone, Default)]
pub struct ModuleOwnerIndex {
    owners_by_module: IndexMap<String, IndexSet<Address>>,
}

impl ModuleOwnerIndex {
    pub fn generate(facts: &WorkspaceFacts) -> Self {
        let mut owners_by_module: IndexMap<String, IndexSet<Address>> = IndexMap::new();

        for target in &facts.targets {
            for file in WorkspaceFacts::owned_files(target) {
                if !file.ends_with(SOURCE_FILE_SUFFIX) {
                    continue;
                }
                let Some(root) = facts.source_root_for(&file) else {
                    debug!(file = %file, owner = %target.address, "no source root, not indexed");
                    continue;
                };
                let Some(module) = module_name(&file, root) else {
                    continue;
                };
                owners_by_module
                    .entry(module)
                    .or_default()
                    .insert(target.address.clone());
            }
        }

        Self { owners_by_module }
    }

    pub fn owners(&self, module: &str) -> ModuleOwners {
        match self.owners_by_module.get(module) {
            Some(owners) if owners.len() == 1 => ModuleOwners::unambiguous(owners.iter().cloned()),
            Some(owners) => ModuleOwners::ambiguous(owners.iter().cloned()),
            None => ModuleOwners::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.owners_by_module.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners_by_module.is_empty()
    }
}

//`pkg/__init__.py` is the module `pkg`; a top-level `__init__.py` names nothing
fn module_name(file: &str, root: &str) -> Option<String> {
    let module = module_for_path(file, root);
    if module == PACKAGE_INIT {
        return None;
    }
    match module.strip_suffix(PACKAGE_INIT).and_then(|m| m.strip_suffix('.')) {
        Some(package) => Some(package.to_string()),
        None => Some(module),
    }
}
