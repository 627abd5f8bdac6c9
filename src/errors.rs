//! Unified error types and result handling.
//!
//! Every core operation returns [`Result`]. Workflow violations are typed variants so the
//! calling layer can map them onto its own responses; nothing here is retried internally.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the planning and load-accounting core.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Input failed a basic validation rule (empty names, unknown references, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Referenced record does not exist
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of record (e.g. "planning phase")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// State machine precondition violated
    #[error("Cannot {action} {entity} in state '{state}'")]
    InvalidTransition {
        /// Kind of record whose state blocked the action
        entity: &'static str,
        /// Current state of that record
        state: String,
        /// The attempted action
        action: &'static str,
    },

    /// The semester already has a phase that is not archived
    #[error("Semester {semester_id} already has non-archived planning phase {phase_id}")]
    ConflictingActivePhase {
        /// Semester the new phase was requested for
        semester_id: i64,
        /// The phase that blocks creation
        phase_id: i64,
    },

    /// A statement for this (phase, person) pair already exists
    #[error("Person {person_id} already has a load statement in phase {phase_id}")]
    DuplicateStatement {
        /// Planning phase
        phase_id: i64,
        /// Person the statement belongs to
        person_id: i64,
    },

    /// A uniqueness rule other than the statement pair was violated
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable description
        message: String,
    },

    /// End date is not after start date
    #[error("Invalid date range: {start} to {end}")]
    InvalidRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// Rejection without a justification
    #[error("A rejection requires a non-empty reason")]
    MissingReason,

    /// Edit attempted on an approved or rejected statement
    #[error("Load statement {statement_id} is {status} and can no longer be changed")]
    ImmutableRecord {
        /// The finalized statement
        statement_id: i64,
        /// Its final status
        status: String,
    },

    /// Submission attempted without the data it needs
    #[error("Incomplete data: {message}")]
    IncompleteData {
        /// Human-readable description
        message: String,
    },

    /// The acting role may not perform the operation
    #[error("Role '{role}' is not allowed to {action}")]
    AuthorizationDenied {
        /// Role of the acting user
        role: String,
        /// The denied action
        action: &'static str,
    },

    /// Hour value is negative, NaN or infinite
    #[error("Invalid SWS value: {value}")]
    InvalidHours {
        /// The rejected value
        value: f64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
