//! OrgTree Core - organization hierarchy engine
//!
//! This crate keeps a forest of organizations consistent under mutation:
//! - Composite identity derivation (`{data_source_id}:{origin_id}`)
//! - Nested-interval tree index with subtree move and delete repair
//! - Sibling ordering policy (Affiliated before Normal)
//! - Distinct-name composition with per-dataset stop rules
//! - Acyclic, one-to-one replacement chains
//!
//! All mutations go through `apply()`, which is all-or-nothing; `Hierarchy`
//! wraps a store for shared use.

pub use orgtree_core_types as core_types;

pub mod apply;
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod logging_facility;
pub mod model;
pub mod mutation;
pub mod naming;
pub mod ops;
pub mod policy;
pub mod render;
pub mod replacement;
pub mod rules;
pub mod tree;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use config::HierarchySettings;
pub use engine::Hierarchy;
pub use errors::{ExError, ExErrorKind, OrgTreeError, Result};
pub use model::{Category, Interval, NewOrganization, Organization, OrganizationKind, OrganizationPatch};
pub use mutation::{MutationOutcome, MutationStage};
pub use ops::{MemoryStore, RecordStore};
pub use policy::{ConfiguredDatasetPolicy, DatasetPolicy, NoStopPolicy};
pub use tree::Position;
