//! Typed Spotinst API payloads
//!
//! Every member is optional so the same types serve full create requests,
//! sparse update requests and API responses. Members that an update may need
//! to clear are [`Nullable`](spotform_core::Nullable).

pub mod common;
pub mod elastigroup;
pub mod ocean;

pub use common::{Capacity, Tag};
pub use elastigroup::Group;
pub use ocean::Cluster;
