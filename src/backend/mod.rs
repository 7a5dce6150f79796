//! Port to the remote clinic backend.
//!
//! Authentication, availability and persistence all live behind this trait.
//! Workflows only ever see `ClinicBackend`, so tests can swap the HTTP
//! adapter for the in-memory one without timers or sockets.
//!
//! The crate does not order concurrent mutations of the same appointment.
//! Implementations must refuse to move an appointment out of a terminal
//! status and report that as [`BackendError::Conflict`], or as
//! [`BackendError::ConflictUnknownStatus`] when the current status is not
//! known.

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentId, AppointmentStatus, Slot, Specialty};
use crate::session::{Credentials, LoginResponse, Session};

// ═══════════════════════════════════════════════════════════
// Request types
// ═══════════════════════════════════════════════════════════

/// Body of `POST /availability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub requested_at: NaiveDateTime,
    pub specialty: Specialty,
}

/// Body of `POST /appointments/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl Outcome {
    /// Pulls the outcome off an appointment that has been completed locally.
    pub fn from_completed(appointment: &Appointment) -> Option<Self> {
        Some(Self {
            diagnosis: appointment.diagnosis.clone()?,
            recommendations: appointment.recommendations.clone(),
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Cannot connect to clinic backend at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account already registered: {0}")]
    AlreadyRegistered(String),
    #[error("No availability for {specialty} on {date}")]
    NoAvailability { specialty: Specialty, date: NaiveDate },
    #[error("Appointment not found: {0}")]
    NotFound(AppointmentId),
    #[error("Appointment {id} is already {status}")]
    Conflict {
        id: AppointmentId,
        status: AppointmentStatus,
    },
    #[error("Appointment id already in use: {0}")]
    DuplicateId(AppointmentId),
    #[error("Appointment {0} conflicts with its current state")]
    ConflictUnknownStatus(AppointmentId),
    #[error("Internal lock error")]
    LockPoisoned,
}

impl BackendError {
    /// The appointment was already in a state that refuses the change.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::ConflictUnknownStatus(_))
    }
}

// ═══════════════════════════════════════════════════════════
// Port
// ═══════════════════════════════════════════════════════════

#[async_trait]
pub trait ClinicBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError>;

    async fn register(&self, credentials: &Credentials) -> Result<(), BackendError>;

    /// Ask for a slot close to the requested time. The backend picks the
    /// provider and the exact time.
    async fn search_availability(&self, query: &AvailabilityQuery) -> Result<Slot, BackendError>;

    /// Book a previously offered slot for the session's patient.
    async fn confirm_appointment(
        &self,
        session: &Session,
        slot: &Slot,
    ) -> Result<Appointment, BackendError>;

    /// All appointments of the session's patient.
    async fn list_appointments(&self, session: &Session) -> Result<Vec<Appointment>, BackendError>;

    /// The session doctor's appointments on one day.
    async fn daily_agenda(
        &self,
        session: &Session,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, BackendError>;

    async fn cancel_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
    ) -> Result<Appointment, BackendError>;

    async fn complete_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
        outcome: &Outcome,
    ) -> Result<Appointment, BackendError>;
}
