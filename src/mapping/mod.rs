pub mod facts;
pub mod generator;
pub mod memory;

pub use facts::WorkspaceFacts;
pub use generator::ModuleOwnerIndex;
pub use memory::MemoryGraph;
