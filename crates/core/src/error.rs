//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Which uniqueness or freshness rule a [`DomainError::Conflict`] reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// An insert targeted a SKU that is already issued.
    DuplicateSku,
    /// A category or location name is already taken.
    DuplicateName,
    /// The record changed since the caller's view was read.
    StaleVersion,
}

impl core::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ConflictKind::DuplicateSku => "duplicate sku",
            ConflictKind::DuplicateName => "duplicate name",
            ConflictKind::StaleVersion => "stale version",
        };
        f.write_str(s)
    }
}

/// Domain-level error.
///
/// Every variant carries enough structure (kind plus offending field or id)
/// for a caller to react programmatically. Infrastructure failures are mapped
/// into this taxonomy at the store boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or constraint-violating input, rejected before any store access.
    #[error("validation failed on `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The operation would break a domain invariant (e.g. negative stock).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness clash or lost-update race.
    #[error("conflict ({kind}): {detail}")]
    Conflict { kind: ConflictKind, detail: String },

    /// The request context lacks the privileges the operation needs.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    pub fn stale(detail: impl Into<String>) -> Self {
        Self::conflict(ConflictKind::StaleVersion, detail)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Stable machine-readable code, e.g. for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "validation_error",
            DomainError::InvariantViolation(_) => "invariant_violation",
            DomainError::InvalidId(_) => "invalid_id",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Conflict { .. } => "conflict",
            DomainError::Unauthorized(_) => "unauthorized",
        }
    }

    pub fn is_conflict(&self, kind: ConflictKind) -> bool {
        matches!(self, DomainError::Conflict { kind: k, .. } if *k == kind)
    }
}
