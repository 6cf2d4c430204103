use thiserror::Error;

use crate::core::types::Address;

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

pub const CONSOLE_SCRIPTS_DOC_URL: &str = "https://python-packaging.readthedocs.io/en/latest/command-line-scripts.html#the-console-scripts-entry-point";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A field value that cannot be resolved. Always scoped to one target.
    #[error("Invalid `{field}` field for the target {address}: {message}")]
    InvalidField {
        address: Address,
        field: String,
        message: String,
    },

    /// A callable entry point category got an entry without a function.
    #[error(
        "Every entry point in `{category}` for {address} must end in the format `:my_func`, \
         but {name} set it to {spec:?}. For example, set \
         `entry_points={{\"{category}\": {{\"{name}\": \"{module}:main\"}}}}`. See {url}.",
        url = CONSOLE_SCRIPTS_DOC_URL
    )]
    InvalidEntryPoint {
        category: String,
        name: String,
        address: Address,
        spec: String,
        module: String,
    },

    #[error("Unmatched glob from {origin}: {glob:?}")]
    NoMatchingFiles { glob: String, origin: String },

    #[error("Invalid glob {glob:?} from {origin}: {reason}")]
    InvalidGlob {
        glob: String,
        origin: String,
        reason: String,
    },

    #[error("No source root found for `{path}`")]
    NoSourceRoot { path: String },

    #[error("The address {0} does not exist")]
    UnknownTarget(Address),

    #[error("Invalid address `{raw}`: {reason}")]
    InvalidAddress { raw: String, reason: String },
}

impl ResolveError {
    pub fn invalid_field(
        address: &Address,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ResolveError::InvalidField {
            address: address.clone(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raised by [`crate::core::entry_point::EntryPoint::parse`]. Carries no address, callers
/// attach one through [`ResolveError::invalid_field`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EntryPointParseError(pub String);
