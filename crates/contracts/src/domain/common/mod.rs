//! Common types shared by all meta-owning aggregates

pub mod host_type;

// Re-exports
pub use host_type::HostType;
