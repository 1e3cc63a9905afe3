//! # Error Types
//!
//! Structured error types for takeoff_core. Expected domain conditions
//! (unknown spec ids, bad grid queries, unsorted grid lines) are *not*
//! errors: they are skipped or reported as validation results. `CalcError`
//! is reserved for inputs that would otherwise turn into `NaN`/`Infinity`,
//! for explicit lookups, and for file operations.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::errors::{CalcError, CalcResult};
//!
//! fn validate_spacing(spacing_mm: f64) -> CalcResult<()> {
//!     if spacing_mm <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "main_bar_spacing_mm".to_string(),
//!             value: spacing_mm.to_string(),
//!             reason: "Spacing must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for takeoff_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for takeoff operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (negative dimension, zero spacing, slot out of range)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A grid query could not be resolved into a usable area
    #[error("Invalid grid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// Explicit lookup of a specification that is not in the floor catalog
    #[error("{kind} specification not found: {id}")]
    SpecNotFound { kind: String, id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        CalcError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create a SpecNotFound error
    pub fn spec_not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CalcError::SpecNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            CalcError::SpecNotFound { .. } => "SPEC_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Reject negative or non-finite dimensions.
pub(crate) fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Dimension must be a finite, non-negative number",
        ));
    }
    Ok(())
}

/// Reject spacings that would divide by zero for a bar that is actually present.
pub(crate) fn require_spacing(field: &str, bar_size: Option<u32>, spacing: f64) -> CalcResult<()> {
    let present = matches!(bar_size, Some(size) if size > 0);
    if present && (!spacing.is_finite() || spacing <= 0.0) {
        return Err(CalcError::invalid_input(
            field,
            spacing.to_string(),
            "Spacing must be positive when a bar size is given",
        ));
    }
    Ok(())
}
