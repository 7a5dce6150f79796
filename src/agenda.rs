//! Doctor's daily agenda and consultation outcome.

use chrono::NaiveDate;
use serde::Serialize;

use crate::authorization::{self, Action};
use crate::backend::{ClinicBackend, Outcome};
use crate::error::ClinicError;
use crate::lifecycle::{self, ValidationError};
use crate::models::{Appointment, AppointmentId, AppointmentStatus};
use crate::session::Session;

// ─── Agenda ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// One day of a doctor's appointments, grouped by status.
///
/// Open appointments (`SCHEDULED` and `ACTIVE`) share the `scheduled` group.
/// Every group is sorted by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAgenda {
    pub day: NaiveDate,
    pub scheduled: Vec<Appointment>,
    pub completed: Vec<Appointment>,
    pub cancelled: Vec<Appointment>,
    pub counts: StatusCounts,
}

impl DailyAgenda {
    /// Builds the agenda for `day`. Appointments on other days are dropped.
    pub fn from_appointments(day: NaiveDate, appointments: Vec<Appointment>) -> Self {
        let mut agenda = Self {
            day,
            scheduled: Vec::new(),
            completed: Vec::new(),
            cancelled: Vec::new(),
            counts: StatusCounts::default(),
        };
        for appointment in appointments {
            agenda.insert(appointment);
        }
        agenda
    }

    fn insert(&mut self, appointment: Appointment) {
        if appointment.scheduled_at.date() != self.day {
            return;
        }
        let group = match appointment.status {
            AppointmentStatus::Scheduled | AppointmentStatus::Active => &mut self.scheduled,
            AppointmentStatus::Completed => &mut self.completed,
            AppointmentStatus::Cancelled => &mut self.cancelled,
        };
        let pos = group.partition_point(|a| a.scheduled_at <= appointment.scheduled_at);
        group.insert(pos, appointment);
        self.recount();
    }

    fn recount(&mut self) {
        self.counts = StatusCounts {
            scheduled: self.scheduled.len(),
            completed: self.completed.len(),
            cancelled: self.cancelled.len(),
        };
    }

    pub fn total(&self) -> usize {
        self.scheduled.len() + self.completed.len() + self.cancelled.len()
    }

    pub fn get(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.scheduled
            .iter()
            .chain(&self.completed)
            .chain(&self.cancelled)
            .find(|a| &a.id == id)
    }

    /// Replaces an appointment with its updated version, moving it to the
    /// group for its new status.
    pub fn update(&mut self, appointment: Appointment) {
        for group in [&mut self.scheduled, &mut self.completed, &mut self.cancelled] {
            group.retain(|a| a.id != appointment.id);
        }
        self.insert(appointment);
        self.recount();
    }
}

pub async fn load_daily_agenda(
    backend: &dyn ClinicBackend,
    session: &Session,
    day: NaiveDate,
) -> Result<DailyAgenda, ClinicError> {
    authorization::require(session, Action::ViewDailyAgenda)?;
    let appointments = backend.daily_agenda(session, day).await?;
    let agenda = DailyAgenda::from_appointments(day, appointments);
    tracing::debug!(
        user_id = session.user_id(),
        %day,
        scheduled = agenda.counts.scheduled,
        completed = agenda.counts.completed,
        cancelled = agenda.counts.cancelled,
        "Loaded daily agenda"
    );
    Ok(agenda)
}

// ─── Completion ───────────────────────────────────────────────────────────────

/// Marks a scheduled appointment as completed and persists the outcome.
///
/// The diagnosis is checked locally first; a blank one never reaches the
/// backend.
pub async fn complete_appointment(
    backend: &dyn ClinicBackend,
    session: &Session,
    appointment: &Appointment,
    diagnosis: &str,
    recommendations: &str,
) -> Result<Appointment, ClinicError> {
    authorization::require(session, Action::CompleteAppointment)?;
    let completed = lifecycle::complete(appointment, diagnosis, recommendations)?;
    let outcome = Outcome::from_completed(&completed).ok_or(ValidationError::DiagnosisRequired)?;

    let stored = backend
        .complete_appointment(session, &appointment.id, &outcome)
        .await?;
    tracing::info!(
        user_id = session.user_id(),
        appointment_id = %stored.id,
        "Appointment completed"
    );
    Ok(stored)
}

/// Diagnosis form state for one appointment.
///
/// A completed appointment opens pre-filled with its stored outcome; anything
/// else opens blank. A provisional save is only kept in memory, so leaving a
/// scheduled appointment after one loses work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisDraft {
    appointment_id: AppointmentId,
    status: AppointmentStatus,
    pub diagnosis: String,
    pub recommendations: String,
    provisionally_saved: bool,
}

impl DiagnosisDraft {
    pub fn open(appointment: &Appointment) -> Self {
        let (diagnosis, recommendations) = match appointment.status {
            AppointmentStatus::Completed => (
                appointment.diagnosis.clone().unwrap_or_default(),
                appointment.recommendations.clone().unwrap_or_default(),
            ),
            _ => (String::new(), String::new()),
        };
        Self {
            appointment_id: appointment.id.clone(),
            status: appointment.status,
            diagnosis,
            recommendations,
            provisionally_saved: false,
        }
    }

    pub fn appointment_id(&self) -> &AppointmentId {
        &self.appointment_id
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn save_provisional(&mut self) {
        self.provisionally_saved = true;
    }

    pub fn is_provisionally_saved(&self) -> bool {
        self.provisionally_saved
    }

    /// Closing now would discard a provisional save.
    pub fn has_unsaved_provisional(&self) -> bool {
        self.provisionally_saved && self.status == AppointmentStatus::Scheduled
    }

    /// Completes `appointment` with the draft's text. On success the draft
    /// reflects the completed appointment.
    pub async fn submit(
        &mut self,
        backend: &dyn ClinicBackend,
        session: &Session,
        appointment: &Appointment,
    ) -> Result<Appointment, ClinicError> {
        if appointment.id != self.appointment_id {
            return Err(ClinicError::InvalidInput(format!(
                "draft belongs to appointment {}, not {}",
                self.appointment_id, appointment.id
            )));
        }
        let stored = complete_appointment(
            backend,
            session,
            appointment,
            &self.diagnosis,
            &self.recommendations,
        )
        .await?;
        *self = Self::open(&stored);
        Ok(stored)
    }
}
