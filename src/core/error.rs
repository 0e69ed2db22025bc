//! Error handling for the exporter
//!
//! This module provides the strongly-typed error enum of the exporter and the
//! user-facing error reporting of the CLI. The error system follows two rules:
//! 1. **Strongly-typed errors** for the failure modes code has to tell apart
//! 2. **User-friendly messages** with suggestions when an error reaches the CLI
//!
//! # Error Categories
//!
//! - **Lookup**: [`ExportError::ModNotFound`], [`ExportError::CombinationNotFound`],
//!   [`ExportError::EntityNotFound`]. Fatal to a single command, recoverable for a batch.
//! - **Dump**: [`ExportError::DumpParse`], [`ExportError::GameProcess`],
//!   [`ExportError::GameTimeout`]. Retried by the instance up to the configured ceiling.
//! - **Consistency**: [`ExportError::EntityKindMismatch`], [`ExportError::CreatorNotSetUp`].
//!   Always fatal, they indicate a bug in the pipeline rather than bad input.
//! - **Configuration**: [`ExportError::BaseModMissing`], [`ExportError::Config`],
//!   [`ExportError::ManifestWrite`]. Fatal to the whole run.
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] into an
//! [`ErrorContext`] which knows how to print itself and which exit code to use.
//!
//! # Examples
//!
//! ```rust,no_run
//! use factorio_export::core::{ExportError, user_friendly_error};
//!
//! let error = anyhow::Error::from(ExportError::ModNotFound {
//!     name: "bobplates".to_string(),
//! });
//! let context = user_friendly_error(error);
//! context.display();
//! assert_eq!(context.exit_code(), 404);
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::{EXIT_CODE_EXPORT_FAILED, EXIT_CODE_NOT_FOUND};

/// Stage of the game output a dump failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStage {
    /// The data stage payload between the DATA markers.
    Data,
    /// The control stage payload between the CONTROL markers.
    Control,
    /// The checksum lines carrying the mod load order.
    ModNames,
}

impl fmt::Display for DumpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "DATA"),
            Self::Control => write!(f, "CONTROL"),
            Self::ModNames => write!(f, "MOD_NAMES"),
        }
    }
}

/// The main error type of the exporter.
///
/// Each variant represents one failure mode of the pipeline and carries the
/// names, hashes or paths needed to understand it without a debugger.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A mod name was requested which is not known to the mod registry.
    #[error("Mod '{name}' not found")]
    ModNotFound {
        /// The requested mod name
        name: String,
    },

    /// A combination id was referenced which is not present in the registry.
    #[error("Combination '{id}' not found")]
    CombinationNotFound {
        /// The referenced combination id
        id: String,
    },

    /// An entity hash was referenced which is not present in the registry.
    #[error("{kind} with hash '{hash}' not found")]
    EntityNotFound {
        /// The kind of entity which was expected
        kind: String,
        /// The referenced content hash
        hash: String,
    },

    /// The raw game output could not be turned into a dump.
    #[error("Failed to parse the {stage} stage of the dump: {reason}")]
    DumpParse {
        /// The stage which failed to parse
        stage: DumpStage,
        /// What exactly went wrong
        reason: String,
    },

    /// The game process failed to start or exited unsuccessfully.
    #[error("Game process failed: {reason}")]
    GameProcess {
        /// The reason of the failure, usually the captured stderr
        reason: String,
    },

    /// The game process did not finish within the configured timeout.
    #[error("Game process timed out after {seconds} seconds")]
    GameTimeout {
        /// The timeout which was exceeded
        seconds: u64,
    },

    /// An entity of one kind was found where another kind was expected.
    ///
    /// This is an invariant violation inside the pipeline: hash lists of a
    /// combination must only ever reference entities of their own kind.
    #[error("Entity '{hash}' is a {actual}, expected a {expected}")]
    EntityKindMismatch {
        /// The content hash of the offending entity
        hash: String,
        /// The kind the caller expected
        expected: String,
        /// The kind actually stored under the hash
        actual: String,
    },

    /// The combination creator was used before being set up for a mod.
    #[error("Combination creator used before setup_for_mod was called")]
    CreatorNotSetUp,

    /// The base mod is missing from the mod registry.
    #[error("The base mod is not present in the mod registry")]
    BaseModMissing,

    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the invalid setting
        message: String,
    },

    /// The info.json of the dump mod could not be written.
    #[error("Failed to write dump mod manifest {path}: {reason}")]
    ManifestWrite {
        /// Path of the manifest
        path: String,
        /// The underlying reason
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Anything else worth a message
    #[error("{message}")]
    Other {
        /// The message
        message: String,
    },
}

impl ExportError {
    /// Whether the error belongs to the lookup category (missing mod, combination or entity).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ModNotFound { .. }
                | Self::CombinationNotFound { .. }
                | Self::EntityNotFound { .. }
        )
    }

    /// Whether running the same combination again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DumpParse { .. } | Self::GameProcess { .. } | Self::GameTimeout { .. })
    }

    /// Whether the error must abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EntityKindMismatch { .. }
                | Self::CreatorNotSetUp
                | Self::BaseModMissing
                | Self::Config { .. }
                | Self::ManifestWrite { .. }
        )
    }
}

/// Error wrapper adding details and a suggestion for CLI output.
///
/// When displayed, the error message is printed in red, the details in yellow
/// and the suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub message: String,
    /// Whether the error was a lookup failure
    pub not_found: bool,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from an [`ExportError`].
    #[must_use]
    pub fn new(error: &ExportError) -> Self {
        Self {
            message: error.to_string(),
            not_found: error.is_not_found(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Process exit code for this error: 404 for lookups, 500 for everything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.not_found {
            EXIT_CODE_NOT_FOUND
        } else {
            EXIT_CODE_EXPORT_FAILED
        }
    }

    /// Print the error banner to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!();
        eprintln!("{}", " ERROR ".on_red().white().bold());
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// The error chain is searched for an [`ExportError`] so that context added
/// with [`anyhow::Context`] does not hide the category of the failure.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = error.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ");

    let Some(export_error) = error.chain().find_map(|e| e.downcast_ref::<ExportError>()) else {
        return ErrorContext {
            message: chain,
            not_found: false,
            suggestion: None,
            details: None,
        };
    };

    let context = ErrorContext {
        message: chain,
        not_found: export_error.is_not_found(),
        suggestion: None,
        details: None,
    };

    match export_error {
        ExportError::ModNotFound { .. } => context
            .with_suggestion("Run 'fie update-list' to refresh the mod registry from the mods directory"),
        ExportError::CombinationNotFound { .. } | ExportError::EntityNotFound { .. } => context
            .with_details("The data directory references data which no longer exists")
            .with_suggestion("Export the mod again to rebuild its combinations"),
        ExportError::BaseModMissing => context
            .with_suggestion("Check that factorio_directory points to a game installation containing data/base"),
        ExportError::Config { .. } => {
            context.with_suggestion("Check the configuration file passed with --config or FIE_CONFIG")
        }
        ExportError::EntityKindMismatch { .. } | ExportError::CreatorNotSetUp => context
            .with_details("This is an internal consistency error of the export pipeline"),
        ExportError::GameTimeout { .. } => context
            .with_suggestion("Increase process_timeout_secs in the configuration"),
        _ => context,
    }
}
