// entry point syntax + normalization of `pex_binary` entry points
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{EntryPointParseError, ResolveError, Result};
use crate::core::graph::{PathGlobs, Resolver};
use crate::core::target::{ENTRY_POINT_FIELD, PexEntryPointField};

/// Module spellings meaning "this binary has no entry point".
pub const NONE_SENTINELS: [&str; 2] = ["<none>", "<None>"];

pub const SOURCE_FILE_SUFFIX: &str = ".py";

/// A `module[:function]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryPoint {
    pub module: String,
    pub function: Option<String>,
}

impl EntryPoint {
    pub fn new(module: impl Into<String>, function: Option<&str>) -> Self {
        Self {
            module: module.into(),
            function: function.map(str::to_string),
        }
    }

    /// Parse `module_name_or_path(:function_name)?`.
    ///
    /// `provenance` describes where the value came from and is woven into error messages.
    pub fn parse(
        value: &str,
        provenance: Option<&str>,
    ) -> std::result::Result<Self, EntryPointParseError> {
        let given = match provenance {
            Some(p) => format!("entry point {p}"),
            None => "entry point".to_string(),
        };
        let entry_point = value.trim();
        if entry_point.is_empty() {
            return Err(EntryPointParseError(format!(
                "The {given} cannot be blank. It must indicate a Python module by name or path \
                 and an optional nullary function in that module separated by a colon, i.e.: \
                 module_name_or_path(':'function_name)?"
            )));
        }

        let (module, function) = match entry_point.split_once(':') {
            Some((module, function)) => (module.trim(), Some(function.trim())),
            None => (entry_point, None),
        };

        if module.is_empty() {
            return Err(EntryPointParseError(format!(
                "The {given} must specify a module; given: {value:?}"
            )));
        }
        if let Some(function) = function {
            if function.contains(':') {
                return Err(EntryPointParseError(format!(
                    "The {given} has more than one colon; given: {value:?}"
                )));
            }
            if function.is_empty() {
                return Err(EntryPointParseError(format!(
                    "The {given} has a colon but no function specified after it; given: {value:?}"
                )));
            }
        }

        Ok(EntryPoint::new(module, function))
    }

    /// `module` or `module:function`.
    pub fn spec(&self) -> String {
        match &self.function {
            Some(function) => format!("{}:{}", self.module, function),
            None => self.module.clone(),
        }
    }

    pub fn with_module(&self, module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: self.function.clone(),
        }
    }

    pub fn is_none_sentinel(&self) -> bool {
        NONE_SENTINELS.contains(&self.module.as_str())
    }

    pub fn is_file_name(&self) -> bool {
        self.module.ends_with(SOURCE_FILE_SUFFIX)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}

impl TryFrom<String> for EntryPoint {
    type Error = EntryPointParseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        EntryPoint::parse(&value, None)
    }
}

impl From<EntryPoint> for String {
    fn from(value: EntryPoint) -> Self {
        value.spec()
    }
}

/// The entry point of a `pex_binary` after file names have been turned into modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPexEntryPoint {
    /// `None` when the binary opted out with `<none>`.
    pub val: Option<EntryPoint>,
    /// The declaration was a file path, so the module lives at or below the binary's directory.
    pub file_name_used: bool,
}

impl ResolvedPexEntryPoint {
    pub fn none() -> Self {
        Self {
            val: None,
            file_name_used: false,
        }
    }
}

impl Resolver {
    /// Normalize the `entry_point` field of a `pex_binary`.
    ///
    /// Supported schemes:
    /// 1) `<none>` or `<None>` => no entry point
    /// 2) `path.to.module` => kept as is
    /// 3) `path.to.module:func` => kept as is
    /// 4) `app.py` => `path.to.app`
    /// 5) `app.py:func` => `path.to.app:func`
    pub async fn resolve_pex_entry_point(
        &self,
        field: &PexEntryPointField,
    ) -> Result<ResolvedPexEntryPoint> {
        let ep_val = &field.value;
        let address = &field.address;

        if ep_val.is_none_sentinel() {
            return Ok(ResolvedPexEntryPoint::none());
        }

        if !ep_val.is_file_name() {
            return Ok(ResolvedPexEntryPoint {
                val: Some(ep_val.clone()),
                file_name_used: false,
            });
        }

        //the file is relative to the directory of the declaring target
        let full_glob = join_spec_path(&address.spec_path, &ep_val.module);
        let entry_point_paths = self
            .engine()
            .resolve_paths(&PathGlobs::new(
                vec![full_glob.clone()],
                format!("{address}'s `{ENTRY_POINT_FIELD}` field"),
            ))
            .await?;

        //an unmatched glob already errored in the engine; more than one file means a wildcard
        let entry_point_path = match entry_point_paths.files.as_slice() {
            [single] => single,
            [] => {
                return Err(ResolveError::NoMatchingFiles {
                    glob: full_glob,
                    origin: format!("{address}'s `{ENTRY_POINT_FIELD}` field"),
                });
            }
            many => {
                return Err(ResolveError::invalid_field(
                    address,
                    ENTRY_POINT_FIELD,
                    format!(
                        "Multiple files matched for the `{ENTRY_POINT_FIELD}` {:?} for the target \
                         {address}, but only one file expected. Are you using a glob, rather \
                         than a file name?\n\nAll matching files: {many:?}.",
                        ep_val.spec()
                    ),
                ));
            }
        };

        let source_root = self.engine().source_root_for_file(entry_point_path).await?;
        let normalized = module_for_path(entry_point_path, &source_root.path);
        debug!(
            target = %address,
            file = %entry_point_path,
            module = %normalized,
            "resolved entry point file to module"
        );

        Ok(ResolvedPexEntryPoint {
            val: Some(ep_val.with_module(normalized)),
            file_name_used: true,
        })
    }
}

pub(crate) fn join_spec_path(spec_path: &str, relative: &str) -> String {
    if spec_path.is_empty() {
        relative.to_string()
    } else {
        format!("{spec_path}/{relative}")
    }
}

/// Strip `source_root` from `path`, drop the file extension and turn separators into dots.
pub fn module_for_path(path: &str, source_root: &str) -> String {
    let stripped = match source_root {
        "" | "." => path,
        root => path
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path),
    };
    let without_ext = Path::new(stripped).with_extension("");
    without_ext
        .to_string_lossy()
        .split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Address;
    use crate::mapping::{MemoryGraph, WorkspaceFacts};
    use std::sync::Arc;

    fn resolver(files: &[&str], source_roots: &[&str]) -> Resolver {
        let facts = WorkspaceFacts::new(files, source_roots, Vec::new());
        Resolver::new(Arc::new(MemoryGraph::new(facts)))
    }

    fn field(spec_path: &str, raw: &str) -> PexEntryPointField {
        PexEntryPointField {
            address: Address::new(spec_path, "bin"),
            value: EntryPoint::parse(raw, None).unwrap(),
        }
    }

    #[test]
    fn parse_module_and_function() {
        let ep = EntryPoint::parse("  pkg.mod:func ", None).unwrap();
        assert_eq!(ep.module, "pkg.mod");
        assert_eq!(ep.function.as_deref(), Some("func"));
        assert_eq!(ep.spec(), "pkg.mod:func");

        let module_only = EntryPoint::parse("pkg.mod", None).unwrap();
        assert_eq!(module_only.function, None);
        assert_eq!(module_only.spec(), "pkg.mod");
    }

    #[test]
    fn parse_rejects_malformed_values() {
        let blank =
            EntryPoint::parse("   ", Some("run for //dist:dist console_scripts")).unwrap_err();
        assert!(
            blank
                .0
                .contains("entry point run for //dist:dist console_scripts cannot be blank")
        );

        let no_module = EntryPoint::parse(":main", None).unwrap_err();
        assert!(no_module.0.contains("must specify a module"));

        let no_function = EntryPoint::parse("app:", None).unwrap_err();
        assert!(no_function.0.contains("no function"));

        let two_colons = EntryPoint::parse("app:main:extra", None).unwrap_err();
        assert!(two_colons.0.contains("more than one colon"));
    }

    #[test]
    fn module_for_path_strips_root_and_extension() {
        assert_eq!(module_for_path("app.py", "."), "app");
        assert_eq!(module_for_path("src/python/project/app.py", "src/python"), "project.app");
        assert_eq!(module_for_path("project/cli/main.py", ""), "project.cli.main");
    }

    #[tokio::test]
    async fn none_sentinel_yields_no_entry_point() {
        let r = resolver(&[], &["."]);
        for raw in ["<none>", "<None>"] {
            let resolved = r.resolve_pex_entry_point(&field("app", raw)).await.unwrap();
            assert_eq!(resolved, ResolvedPexEntryPoint::none());
        }
    }

    #[tokio::test]
    async fn sentinel_match_is_exact() {
        let r = resolver(&[], &["."]);
        let resolved = r.resolve_pex_entry_point(&field("app", "<NONE>")).await.unwrap();
        assert_eq!(resolved.val, Some(EntryPoint::new("<NONE>", None)));
    }

    #[tokio::test]
    async fn module_form_is_returned_unchanged() {
        let r = resolver(&[], &["."]);
        for raw in ["path.to.module", "path.to.module:func"] {
            let resolved = r.resolve_pex_entry_point(&field("app", raw)).await.unwrap();
            assert_eq!(resolved.val.unwrap().spec(), raw);
            assert!(!resolved.file_name_used);
        }
    }

    #[tokio::test]
    async fn file_name_is_converted_to_module() {
        let r = resolver(&["src/python/project/app.py"], &["src/python"]);
        let resolved = r
            .resolve_pex_entry_point(&field("src/python/project", "app.py:main"))
            .await
            .unwrap();

        assert_eq!(resolved.val, Some(EntryPoint::new("project.app", Some("main"))));
        assert!(resolved.file_name_used);
    }

    #[tokio::test]
    async fn file_at_source_root_is_a_top_level_module() {
        let r = resolver(&["app/app.py"], &["app"]);
        let resolved = r.resolve_pex_entry_point(&field("app", "app.py:main")).await.unwrap();

        assert_eq!(resolved.val, Some(EntryPoint::new("app", Some("main"))));
        assert!(resolved.file_name_used);
    }

    #[tokio::test]
    async fn file_in_subdirectory_keeps_function_absent() {
        let r = resolver(&["app/cli/run.py"], &["."]);
        let resolved = r.resolve_pex_entry_point(&field("app", "cli/run.py")).await.unwrap();

        assert_eq!(resolved.val, Some(EntryPoint::new("app.cli.run", None)));
        assert!(resolved.file_name_used);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let r = resolver(&["app/other.py"], &["."]);
        let err = r.resolve_pex_entry_point(&field("app", "app.py")).await.unwrap_err();
        match err {
            ResolveError::NoMatchingFiles { glob, origin } => {
                assert_eq!(glob, "app/app.py");
                assert!(origin.contains("//app:bin"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn glob_matching_several_files_is_rejected() {
        let r = resolver(&["app/a.py", "app/b.py"], &["."]);
        let err = r.resolve_pex_entry_point(&field("app", "*.py")).await.unwrap_err();
        match err {
            ResolveError::InvalidField { address, field, message } => {
                assert_eq!(address, Address::new("app", "bin"));
                assert_eq!(field, ENTRY_POINT_FIELD);
                assert!(message.contains("Are you using a glob, rather than a file name?"));
                assert!(message.contains("app/a.py"));
                assert!(message.contains("app/b.py"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
