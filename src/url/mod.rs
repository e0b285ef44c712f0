//! URL handling module for Harrow
//!
//! This module provides origin comparison, link resolution, and
//! normalization of user-supplied URLs.

mod normalize;
mod origin;

pub use normalize::{normalize_input_url, resolve_link};
pub use origin::{origin_root, same_origin};
