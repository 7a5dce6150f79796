//! Patient appointment list and cancellation.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::authorization::{self, Action};
use crate::backend::ClinicBackend;
use crate::error::ClinicError;
use crate::lifecycle::LifecyclePolicy;
use crate::models::{Appointment, AppointmentFilter};
use crate::session::Session;

/// One row of the patient's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    /// Whole hours until the appointment; negative once it has passed.
    pub hours_remaining: i64,
    pub cancellable: bool,
}

impl AppointmentView {
    pub fn new(appointment: Appointment, policy: &LifecyclePolicy, now: NaiveDateTime) -> Self {
        Self {
            hours_remaining: appointment.hours_until(now),
            cancellable: policy.is_cancellable(&appointment, now),
            appointment,
        }
    }
}

/// The session patient's appointments that pass `filter`, oldest first.
pub async fn list_appointments(
    backend: &dyn ClinicBackend,
    session: &Session,
    filter: &AppointmentFilter,
    policy: &LifecyclePolicy,
    now: NaiveDateTime,
) -> Result<Vec<AppointmentView>, ClinicError> {
    authorization::require(session, Action::ViewOwnAppointments)?;
    let mut appointments = backend.list_appointments(session).await?;
    appointments.retain(|a| filter.matches(a));
    appointments.sort_by_key(|a| a.scheduled_at);

    tracing::debug!(
        user_id = session.user_id(),
        count = appointments.len(),
        filtered = !filter.is_empty(),
        "Listed appointments"
    );
    Ok(appointments
        .into_iter()
        .map(|a| AppointmentView::new(a, policy, now))
        .collect())
}

/// Cancels an appointment after checking eligibility locally.
///
/// An ineligible appointment never reaches the backend. The returned value
/// is the backend's record of the cancelled appointment.
pub async fn cancel_appointment(
    backend: &dyn ClinicBackend,
    session: &Session,
    policy: &LifecyclePolicy,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<Appointment, ClinicError> {
    authorization::require(session, Action::CancelAppointment)?;
    if let Err(e) = policy.cancel(appointment, now) {
        tracing::info!(
            user_id = session.user_id(),
            appointment_id = %appointment.id,
            reason = %e,
            "Cancellation refused"
        );
        return Err(e.into());
    }

    let cancelled = backend.cancel_appointment(session, &appointment.id).await?;
    tracing::info!(
        user_id = session.user_id(),
        appointment_id = %cancelled.id,
        "Appointment cancelled"
    );
    Ok(cancelled)
}
