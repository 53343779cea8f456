//! Shared utilities: client-side validation and display-time formatting.

pub mod time;
pub mod validate;
