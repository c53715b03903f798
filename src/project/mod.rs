//! Project metadata: which resources exist, what they expose, and whether a
//! function can be run locally.

pub mod meta;

pub use meta::{Mockability, ProjectMeta, ProvisionedResource, ResourceCatalog, ResourceStatus};
