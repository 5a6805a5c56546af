//! Meta side-table data: rows, values and the inputs of meta operations

pub mod entry;
pub mod filter;
pub mod map;
pub mod value;

// Re-exports
pub use entry::{MetaCollection, MetaEntry};
pub use filter::{MetaCondition, MetaFilter};
pub use map::{MetaFieldDto, MetaMap, MetaWriteDto};
pub use value::MetaValue;
