//! Role-based access for clinic workflows.
//!
//! Rules, checked in order:
//! 1. Patient actions (book, list own, cancel) → patients only
//! 2. Doctor actions (daily agenda, complete) → doctors only
//! 3. Default → DENY

use crate::models::Role;
use crate::session::Session;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Something a logged-in user wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BookAppointment,
    ViewOwnAppointments,
    CancelAppointment,
    ViewDailyAgenda,
    CompleteAppointment,
}

impl Action {
    /// The role an action belongs to.
    pub fn required_role(self) -> Role {
        match self {
            Self::BookAppointment | Self::ViewOwnAppointments | Self::CancelAppointment => {
                Role::Patient
            }
            Self::ViewDailyAgenda | Self::CompleteAppointment => Role::Doctor,
        }
    }
}

/// Why access was granted (or denied), for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    PatientAction,
    DoctorAction,
    Denied,
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            reason: AccessReason::Denied,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("{role} may not perform {action:?}")]
    Forbidden { role: Role, action: Action },
}

// ═══════════════════════════════════════════════════════════
// Checks
// ═══════════════════════════════════════════════════════════

pub fn check_access(session: &Session, action: Action) -> AccessDecision {
    match (session.role(), action.required_role()) {
        (Role::Patient, Role::Patient) => AccessDecision::allow(AccessReason::PatientAction),
        (Role::Doctor, Role::Doctor) => AccessDecision::allow(AccessReason::DoctorAction),
        (Role::Patient, Role::Doctor) | (Role::Doctor, Role::Patient) => AccessDecision::deny(),
    }
}

/// Like [`check_access`], but a denial is an error.
pub fn require(session: &Session, action: Action) -> Result<AccessDecision, AuthorizationError> {
    let decision = check_access(session, action);
    if decision.allowed {
        Ok(decision)
    } else {
        tracing::warn!(
            user_id = session.user_id(),
            role = %session.role(),
            ?action,
            "Access denied"
        );
        Err(AuthorizationError::Forbidden {
            role: session.role(),
            action,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
