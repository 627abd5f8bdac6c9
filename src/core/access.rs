//! Role-based access control.
//!
//! Every core operation starts with [`authorize`], parameterized by the acting user's role
//! and, where ownership matters, the owner of the record being touched. Identity and role
//! come from the calling layer; nothing here authenticates.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Role of the acting user
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Dean or vice dean; reviews statements and decides on duties
    Dean,
    /// Teaching staff; owns their statements
    Professor,
    /// Department office; administers phases, semesters and settings
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dean => "dean",
            Self::Professor => "professor",
            Self::Staff => "staff",
        })
    }
}

/// The authenticated user on whose behalf an operation runs
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Person id of the user
    pub person_id: i64,
    /// Role of the user
    pub role: Role,
}

impl Actor {
    /// Creates an actor
    #[must_use]
    pub const fn new(person_id: i64, role: Role) -> Self {
        Self { person_id, role }
    }
}

/// Something an operation needs to be allowed to do
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Create semesters and move the planning-term flag
    ManageSemesters,
    /// Create and transition planning phases
    ManagePhases,
    /// Create and activate load settings
    ManageSettings,
    /// Maintain the course plan
    ManageCoursePlan,
    /// Maintain the duty catalogue
    ManageDuties,
    /// Request a semester duty for `person_id`
    RequestDuty {
        /// Person the duty is requested for
        person_id: i64,
    },
    /// Approve or reject semester duties
    DecideDuty,
    /// Change a draft statement or its items
    EditStatement {
        /// Owner of the statement
        owner: i64,
    },
    /// Submit a draft statement
    SubmitStatement {
        /// Owner of the statement
        owner: i64,
    },
    /// Approve or reject a submitted statement
    ReviewStatement {
        /// Owner of the statement
        owner: i64,
    },
    /// Read a statement and its breakdown
    ViewStatement {
        /// Owner of the statement
        owner: i64,
    },
    /// Read every statement of a phase
    ViewPhaseStatements,
}

impl Capability {
    const fn action(self) -> &'static str {
        match self {
            Self::ManageSemesters => "manage semesters",
            Self::ManagePhases => "manage planning phases",
            Self::ManageSettings => "manage load settings",
            Self::ManageCoursePlan => "manage the course plan",
            Self::ManageDuties => "manage duties",
            Self::RequestDuty { .. } => "request this semester duty",
            Self::DecideDuty => "decide on semester duties",
            Self::EditStatement { .. } => "edit this load statement",
            Self::SubmitStatement { .. } => "submit this load statement",
            Self::ReviewStatement { .. } => "review this load statement",
            Self::ViewStatement { .. } => "view this load statement",
            Self::ViewPhaseStatements => "view all statements of a phase",
        }
    }
}

/// Checks whether `actor` holds `capability`.
///
/// # Errors
/// Returns [`Error::AuthorizationDenied`] when the role does not grant it.
pub fn authorize(actor: &Actor, capability: Capability) -> Result<()> {
    let is_office = matches!(actor.role, Role::Dean | Role::Staff);
    let allowed = match capability {
        Capability::ManageSemesters
        | Capability::ManagePhases
        | Capability::ManageSettings
        | Capability::ManageCoursePlan
        | Capability::ManageDuties
        | Capability::ViewPhaseStatements => is_office,
        Capability::RequestDuty { person_id } => is_office || actor.person_id == person_id,
        Capability::DecideDuty => actor.role == Role::Dean,
        Capability::EditStatement { owner } => {
            actor.person_id == owner || actor.role == Role::Staff
        }
        Capability::SubmitStatement { owner } => actor.person_id == owner,
        // Deans have statements of their own and may not approve them.
        Capability::ReviewStatement { owner } => {
            actor.role == Role::Dean && actor.person_id != owner
        }
        Capability::ViewStatement { owner } => is_office || actor.person_id == owner,
    };

    if allowed {
        Ok(())
    } else {
        debug!(
            person_id = actor.person_id,
            role = %actor.role,
            action = capability.action(),
            "authorization denied"
        );
        Err(Error::AuthorizationDenied {
            role: actor.role.to_string(),
            action: capability.action(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const DEAN: Actor = Actor::new(1, Role::Dean);
    const PROF: Actor = Actor::new(2, Role::Professor);
    const STAFF: Actor = Actor::new(3, Role::Staff);

    #[test]
    fn test_office_capabilities() {
        for cap in [
            Capability::ManageSemesters,
            Capability::ManagePhases,
            Capability::ManageSettings,
            Capability::ManageCoursePlan,
            Capability::ManageDuties,
            Capability::ViewPhaseStatements,
        ] {
            assert!(authorize(&DEAN, cap).is_ok());
            assert!(authorize(&STAFF, cap).is_ok());
            assert!(matches!(
                authorize(&PROF, cap),
                Err(Error::AuthorizationDenied { .. })
            ));
        }
    }

    #[test]
    fn test_professor_only_touches_own_statement() {
        assert!(authorize(&PROF, Capability::EditStatement { owner: 2 }).is_ok());
        assert!(authorize(&PROF, Capability::SubmitStatement { owner: 2 }).is_ok());
        assert!(authorize(&PROF, Capability::ViewStatement { owner: 2 }).is_ok());

        assert!(authorize(&PROF, Capability::EditStatement { owner: 9 }).is_err());
        assert!(authorize(&PROF, Capability::SubmitStatement { owner: 9 }).is_err());
        assert!(authorize(&PROF, Capability::ViewStatement { owner: 9 }).is_err());
    }

    #[test]
    fn test_staff_edits_but_does_not_submit_for_others() {
        assert!(authorize(&STAFF, Capability::EditStatement { owner: 2 }).is_ok());
        assert!(authorize(&STAFF, Capability::SubmitStatement { owner: 2 }).is_err());
        assert!(authorize(&STAFF, Capability::ReviewStatement { owner: 2 }).is_err());
    }

    #[test]
    fn test_only_dean_reviews_and_never_own() {
        assert!(authorize(&DEAN, Capability::ReviewStatement { owner: 2 }).is_ok());
        assert!(authorize(&DEAN, Capability::ReviewStatement { owner: 1 }).is_err());
        assert!(authorize(&PROF, Capability::ReviewStatement { owner: 9 }).is_err());
    }

    #[test]
    fn test_duty_capabilities() {
        assert!(authorize(&PROF, Capability::RequestDuty { person_id: 2 }).is_ok());
        assert!(authorize(&PROF, Capability::RequestDuty { person_id: 9 }).is_err());
        assert!(authorize(&STAFF, Capability::RequestDuty { person_id: 9 }).is_ok());
        assert!(authorize(&DEAN, Capability::DecideDuty).is_ok());
        assert!(authorize(&STAFF, Capability::DecideDuty).is_err());
    }

    #[test]
    fn test_denial_names_role_and_action() {
        let err = authorize(&PROF, Capability::ManagePhases).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Role 'professor' is not allowed to manage planning phases"
        );
    }
}
