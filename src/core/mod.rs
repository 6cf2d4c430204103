pub mod classify;
pub mod distribution;
pub mod entry_point;
pub mod error;
pub mod graph;
pub mod inject;
#[cfg(test)]
pub(crate) mod logs;
pub mod owners;
pub mod target;
pub mod types;
