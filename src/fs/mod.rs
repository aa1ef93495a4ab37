//! Filesystem module.
//!
//! Provides:
//! - Destination path derivation for posts and resources
//! - Title and path component sanitization

pub mod naming;
pub mod paths;

pub use naming::{sanitize_path_component, sanitize_title};
pub use paths::{candidate_paths, destination_path, ensure_dir, post_directory, KNOWN_EXTENSIONS};
