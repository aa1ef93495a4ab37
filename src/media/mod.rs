//! Post and resource representation.
//!
//! - `PostDescriptor`: one listed item, as produced by the listing or a log file
//! - `ResourceDescriptor`: one concrete file derived from a post
//! - Link classification into host types

pub mod classify;
pub mod post;
pub mod resource;

pub use classify::{classify, HostType};
pub use post::PostDescriptor;
pub use resource::{extension_for_mime, extension_from_url, ResourceDescriptor, ResourceSource};
