//! Document store implementations.

mod eval;
mod memory;

pub use memory::InMemoryDocumentStore;
