pub mod category_ops;
pub mod organization_ops;
pub mod store;

pub use store::{MemoryStore, RecordStore};
