//! Foundation types shared by every layer.
//!
//! - [`FileId`] - Interned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions, re-exported from `text-size`
//!
//! This module has NO dependencies on other crate modules.

mod file_id;

pub use file_id::FileId;
pub use text_size::{TextRange, TextSize};
