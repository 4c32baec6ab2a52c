//! Secondary indexing module
//!
//! Value -> vertex-set indices on chosen vertex fields. They only narrow the
//! candidate set of a pattern search; the store always re-checks candidates.

pub mod manager;
pub mod property_index;

pub use manager::IndexManager;
pub use property_index::{IndexKey, PropertyIndex};
