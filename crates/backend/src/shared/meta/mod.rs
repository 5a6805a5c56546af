//! Meta fields capability: WordPress-style `*meta` side tables exposed on host entities.
//!
//! - [`registry`] maps a host type to its meta table and foreign key;
//! - [`relation`] is the lazy host -> meta rows relation;
//! - [`scope`] adds `EXISTS` meta constraints to host queries;
//! - [`capability`] is the trait host aggregates implement.

pub mod capability;
pub mod error;
pub mod registry;
pub mod relation;
pub mod scope;

pub use capability::MetaCapable;
pub use error::{MetaError, RegistryError};
pub use registry::{MetaBinding, MetaRegistry};
pub use relation::{MetaRelation, PendingMeta};
pub use scope::HasMetaScope;
