//! Storage backends implementing the repository contract.

pub mod in_memory;

pub use in_memory::InMemoryRepository;
