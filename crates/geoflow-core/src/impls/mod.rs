//! Port implementations for development and tests.
//!
//! - **InMemoryRepository**: the task/workflow store behind a single mutex.

pub mod memory_store;

pub use self::memory_store::InMemoryRepository;
