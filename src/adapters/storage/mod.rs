//! Storage adapters - session registry implementations.

mod in_memory;

pub use in_memory::InMemorySessionRegistry;
