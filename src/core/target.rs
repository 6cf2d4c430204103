// targets and the fields entry point resolution reads
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::entry_point::EntryPoint;
use crate::core::error::{ResolveError, Result};
use crate::core::types::Address;

pub const PEX_BINARY_ALIAS: &str = "pex_binary";
pub const PYTHON_DISTRIBUTION_ALIAS: &str = "python_distribution";
pub const PYTHON_SOURCES_ALIAS: &str = "python_sources";

pub const ENTRY_POINT_FIELD: &str = "entry_point";
pub const ENTRY_POINTS_FIELD: &str = "entry_points";

/// `category -> name -> raw spec`, in declaration order.
pub type EntryPointsValue = IndexMap<String, IndexMap<String, String>>;

/// Which flavour of `dependencies` field a target carries. Dependency injectors register
/// against one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependenciesFieldKind {
    PexBinary,
    PythonDistribution,
    Generic,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonProvides {
    /// `name -> address ref` of binaries shipped with the distribution.
    #[serde(default)]
    pub binaries: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub address: Address,
    pub alias: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub entry_point: Option<EntryPoint>,
    #[serde(default)]
    pub entry_points: Option<EntryPointsValue>,
    #[serde(default)]
    pub provides: Option<PythonProvides>,
}

impl Target {
    pub fn new(address: Address, alias: impl Into<String>) -> Self {
        Self {
            address,
            alias: alias.into(),
            dependencies: Vec::new(),
            sources: Vec::new(),
            entry_point: None,
            entry_points: None,
            provides: None,
        }
    }

    pub fn pex_binary(address: Address, entry_point: &str) -> Result<Self> {
        let parsed = EntryPoint::parse(entry_point, Some(format!("for {address}").as_str()))
            .map_err(|e| ResolveError::invalid_field(&address, ENTRY_POINT_FIELD, e.0))?;
        let mut target = Target::new(address, PEX_BINARY_ALIAS);
        target.entry_point = Some(parsed);
        Ok(target)
    }

    pub fn python_distribution(address: Address, entry_points: Option<EntryPointsValue>) -> Self {
        let mut target = Target::new(address, PYTHON_DISTRIBUTION_ALIAS);
        target.entry_points = entry_points;
        target.provides = Some(PythonProvides::default());
        target
    }

    pub fn python_sources(address: Address, sources: &[&str]) -> Self {
        let mut target = Target::new(address, PYTHON_SOURCES_ALIAS);
        target.sources = sources.iter().map(|s| s.to_string()).collect();
        target
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_provided_binaries(mut self, binaries: &[(&str, &str)]) -> Self {
        let provides = self.provides.get_or_insert_with(PythonProvides::default);
        for (name, raw) in binaries {
            provides.binaries.insert(name.to_string(), raw.to_string());
        }
        self
    }

    pub fn dependencies_field_kind(&self) -> DependenciesFieldKind {
        match self.alias.as_str() {
            PEX_BINARY_ALIAS => DependenciesFieldKind::PexBinary,
            PYTHON_DISTRIBUTION_ALIAS => DependenciesFieldKind::PythonDistribution,
            _ => DependenciesFieldKind::Generic,
        }
    }

    /// `None` if the target type has no `entry_point` field.
    pub fn pex_entry_point_field(&self) -> Option<PexEntryPointField> {
        self.entry_point.as_ref().map(|value| PexEntryPointField {
            address: self.address.clone(),
            value: value.clone(),
        })
    }

    pub fn entry_points_field(&self) -> PythonDistributionEntryPointsField {
        PythonDistributionEntryPointsField {
            address: self.address.clone(),
            value: self.entry_points.clone(),
        }
    }

    pub fn provided_binaries(&self) -> Vec<String> {
        self.provides
            .as_ref()
            .map(|p| p.binaries.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PexEntryPointField {
    pub address: Address,
    pub value: EntryPoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonDistributionEntryPointsField {
    pub address: Address,
    pub value: Option<EntryPointsValue>,
}
