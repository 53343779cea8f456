//! Error handling module.
//!
//! Provides the application-wide `AppError` type and the `AppResult` alias
//! used across the data layer. No error from this module is allowed to
//! escape into the view layer as a panic; read-path failures become entry
//! error state and write-path failures are logged at the mutation boundary.

mod app_error;

pub use app_error::{AppError, AppResult, FieldError};
