/// Content-addressed blob store
pub mod blobs;
/// Transactional index and staging tables
pub mod meta;
/// File records and package tags
pub mod record;

pub use blobs::BlobStore;
pub use meta::{MetaStore, Tables, View};
pub use record::{Difference, FileRecord, Package};
