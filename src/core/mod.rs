//! Core types shared by the whole exporter.
//!
//! Currently this is the error handling: the typed [`ExportError`] used by
//! the library and the [`ErrorContext`] presentation used by the CLI.

pub mod error;

pub use error::{DumpStage, ErrorContext, ExportError, user_friendly_error};
