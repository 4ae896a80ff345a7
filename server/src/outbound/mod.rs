//! Outbound adapters implementing the data source ports.
//!
//! Adapters are thin translators owning their storage; they contain no
//! document logic.

pub mod memory;

pub use memory::{LinkPredicate, MemorySource};
