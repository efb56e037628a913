//! Session adapters.

pub mod in_memory;

pub use in_memory::InMemorySession;
