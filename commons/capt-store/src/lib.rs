pub mod error;
pub mod memory;
pub mod merge;
pub mod object;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use object::{ObjectKey, ObjectMeta, OwnerRef};
pub use store::{ObjectRecord, ObjectStore, PatchParams, PatchScope, Trigger};
