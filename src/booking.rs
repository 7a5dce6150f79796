//! Patient booking flow.
//!
//! ```text
//! Selection --search_availability--> Confirmation(slot) --confirm--> Confirmed
//!     ^                                   |
//!     +--------------- back --------------+
//! ```
//!
//! The requested date is checked against the booking window before the
//! backend is asked, and the offered slot is checked again before it is
//! shown and before it is booked.

use chrono::NaiveDateTime;

use crate::authorization::{self, Action};
use crate::backend::{AvailabilityQuery, ClinicBackend};
use crate::error::ClinicError;
use crate::lifecycle::{LifecyclePolicy, ValidationError};
use crate::models::{Appointment, Slot, Specialty};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStep {
    Selection,
    Confirmation(Slot),
    Confirmed(Appointment),
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    policy: LifecyclePolicy,
    step: BookingStep,
}

impl BookingFlow {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self {
            policy,
            step: BookingStep::Selection,
        }
    }

    pub fn step(&self) -> &BookingStep {
        &self.step
    }

    /// Asks the backend for a slot near `requested_at`.
    ///
    /// Only valid in `Selection`. On success the flow moves to
    /// `Confirmation` holding the offered slot; on failure it stays put.
    pub async fn search_availability(
        &mut self,
        backend: &dyn ClinicBackend,
        session: &Session,
        requested_at: NaiveDateTime,
        specialty: Option<Specialty>,
        now: NaiveDateTime,
    ) -> Result<Slot, ClinicError> {
        authorization::require(session, Action::BookAppointment)?;
        if self.step != BookingStep::Selection {
            return Err(ClinicError::BookingState(
                "availability can only be searched from the selection step".into(),
            ));
        }

        self.policy.validate_booking(requested_at, now)?;
        let specialty = specialty.ok_or(ValidationError::SpecialtyRequired)?;

        let query = AvailabilityQuery {
            requested_at,
            specialty,
        };
        let slot = backend.search_availability(&query).await?;
        self.policy.validate_booking(slot.scheduled_at, now)?;

        tracing::info!(
            user_id = session.user_id(),
            %specialty,
            scheduled_at = %slot.scheduled_at,
            provider = %slot.provider,
            "Slot offered"
        );
        self.step = BookingStep::Confirmation(slot.clone());
        Ok(slot)
    }

    /// Books the slot currently on offer.
    pub async fn confirm(
        &mut self,
        backend: &dyn ClinicBackend,
        session: &Session,
        now: NaiveDateTime,
    ) -> Result<Appointment, ClinicError> {
        authorization::require(session, Action::BookAppointment)?;
        let BookingStep::Confirmation(slot) = &self.step else {
            return Err(ClinicError::BookingState("no slot to confirm".into()));
        };

        self.policy.validate_booking(slot.scheduled_at, now)?;
        let appointment = backend.confirm_appointment(session, slot).await?;

        tracing::info!(
            user_id = session.user_id(),
            appointment_id = %appointment.id,
            scheduled_at = %appointment.scheduled_at,
            "Appointment booked"
        );
        self.step = BookingStep::Confirmed(appointment.clone());
        Ok(appointment)
    }

    /// Drops the offered slot and returns to `Selection`. No-op elsewhere.
    pub fn back(&mut self) {
        if matches!(self.step, BookingStep::Confirmation(_)) {
            self.step = BookingStep::Selection;
        }
    }

    /// Starts over, whatever the current step.
    pub fn reset(&mut self) {
        self.step = BookingStep::Selection;
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new(LifecyclePolicy::default())
    }
}
