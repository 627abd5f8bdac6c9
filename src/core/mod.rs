//! Core business logic - framework-agnostic planning and load-accounting operations.
//!
//! Every function takes a database connection and, where a user acts, an
//! [`access::Actor`]. Callers own presentation; nothing here formats output for humans.

/// Role-based access control
pub mod access;
/// Scheduled teaching per semester
pub mod course_plan;
/// Duty catalogue and semester duty assignments
pub mod duty;
/// Pure load computation engine
pub mod load;
/// Planning phase state machine
pub mod phase;
/// Semesters and the planning-term flag
pub mod semester;
/// Versioned load settings
pub mod settings;
/// Load statements, line items and review
pub mod statement;
