//! # Error Types
//!
//! Domain-specific error types for academy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  academy-core errors (this file)                                       │
//! │  └── ValidationError  - Input the editor/visitor can fix               │
//! │                                                                         │
//! │  academy-db errors (separate crate)                                    │
//! │  ├── DbError          - Storage faults (retry-worthy)                  │
//! │  └── RepoError        - Validation | Storage, what pages see           │
//! │                                                                         │
//! │  Flow: ValidationError ──┐                                             │
//! │                          ├──► RepoError ──► page shows message          │
//! │        DbError ──────────┘                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
/// They are always user-fixable: nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email, slug with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., a slug already owned by another record).
    ///
    /// ## When This Occurs
    /// ```text
    /// Admin saves article "b" with slug "lean-canvas-guide"
    ///      │
    ///      ▼
    /// by-slug index already maps "lean-canvas-guide" → "a5"
    ///      │
    ///      ▼
    /// Duplicate { field: "slug", value: "lean-canvas-guide" }
    ///      │
    ///      ▼
    /// Editor shows: "slug 'lean-canvas-guide' already exists"
    /// ```
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("title");
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::TooLong {
            field: "slug".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "slug must be at most 200 characters");

        let err = ValidationError::duplicate("slug", "startup-kpis");
        assert_eq!(err.to_string(), "slug 'startup-kpis' already exists");
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(ValidationError::required("email").field(), "email");
        assert_eq!(
            ValidationError::invalid("primaryColor", "not hex").field(),
            "primaryColor"
        );
    }
}
