//! Shared helpers with no domain knowledge.

pub mod html;
pub mod debounce;
