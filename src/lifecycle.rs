//! Appointment lifecycle rules.
//!
//! Pure functions over `(appointment, now)`:
//! - booking window: a new appointment lands between `now + 1 day` and
//!   `now + 30 days`, both ends inclusive
//! - cancellation: only open appointments, only while more than the
//!   threshold (24h) remains, counted in whole hours
//! - completion: `SCHEDULED` → `COMPLETED` with a non-blank diagnosis
//!
//! ```text
//! SCHEDULED --complete(diagnosis)--> COMPLETED   (terminal)
//! SCHEDULED --cancel(eligible)-----> CANCELLED   (terminal)
//! ```
//!
//! Nothing here mutates its input; transitions return a new value.

use chrono::{NaiveDateTime, TimeDelta};

use crate::config::{BOOKING_MAX_DAYS, BOOKING_MIN_DAYS, CANCELLATION_THRESHOLD_HOURS};
use crate::models::{Appointment, AppointmentStatus};

// ─── Policy ───────────────────────────────────────────────────────────────────

/// Tunable limits for the lifecycle rules.
///
/// Negative values are read as zero, so neither the booking window nor the
/// cancellation threshold can reach into the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub booking_min_days: i64,
    pub booking_max_days: i64,
    pub cancellation_threshold_hours: i64,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            booking_min_days: BOOKING_MIN_DAYS,
            booking_max_days: BOOKING_MAX_DAYS,
            cancellation_threshold_hours: CANCELLATION_THRESHOLD_HOURS,
        }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Input the caller should correct and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Diagnosis required")]
    DiagnosisRequired,
    #[error("Date {candidate} is outside the booking window ({earliest} to {latest})")]
    OutsideBookingWindow {
        candidate: NaiveDateTime,
        earliest: NaiveDateTime,
        latest: NaiveDateTime,
    },
    #[error("No bookable dates after {now}")]
    NoBookingWindow { now: NaiveDateTime },
    #[error("Specialty required")]
    SpecialtyRequired,
    #[error("Appointment is {status}, only SCHEDULED appointments can be completed")]
    NotScheduled { status: AppointmentStatus },
}

/// Why a cancellation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IneligibleReason {
    #[error("appointment is already {0}")]
    Status(AppointmentStatus),
    #[error("{hours_remaining}h remaining, more than {threshold_hours}h required")]
    TooLate {
        hours_remaining: i64,
        threshold_hours: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Cancellation not allowed: {0}")]
    IneligibleCancellation(IneligibleReason),
}

// ─── Booking window ───────────────────────────────────────────────────────────

impl LifecyclePolicy {
    fn cancellation_threshold(&self) -> i64 {
        self.cancellation_threshold_hours.max(0)
    }

    /// Earliest and latest bookable instants relative to `now`, or `None`
    /// when either end falls outside the representable calendar.
    pub fn booking_window(&self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min_days = self.booking_min_days.max(0);
        let max_days = self.booking_max_days.max(min_days);
        let earliest = now.checked_add_signed(TimeDelta::try_days(min_days)?)?;
        let latest = now.checked_add_signed(TimeDelta::try_days(max_days)?)?;
        Some((earliest, latest))
    }

    pub fn is_booking_window_valid(&self, candidate: NaiveDateTime, now: NaiveDateTime) -> bool {
        self.booking_window(now)
            .is_some_and(|(earliest, latest)| candidate >= earliest && candidate <= latest)
    }

    pub fn validate_booking(
        &self,
        candidate: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<(), ValidationError> {
        let Some((earliest, latest)) = self.booking_window(now) else {
            return Err(ValidationError::NoBookingWindow { now });
        };
        if candidate >= earliest && candidate <= latest {
            return Ok(());
        }
        Err(ValidationError::OutsideBookingWindow {
            candidate,
            earliest,
            latest,
        })
    }

    // ─── Cancellation ─────────────────────────────────────────────────────────

    /// Checks both the status and the remaining lead time.
    pub fn cancellation_eligibility(
        &self,
        appointment: &Appointment,
        now: NaiveDateTime,
    ) -> Result<(), IneligibleReason> {
        match appointment.status {
            AppointmentStatus::Scheduled | AppointmentStatus::Active => {}
            status @ (AppointmentStatus::Completed | AppointmentStatus::Cancelled) => {
                return Err(IneligibleReason::Status(status));
            }
        }

        let hours_remaining = appointment.hours_until(now);
        let threshold_hours = self.cancellation_threshold();
        if hours_remaining > threshold_hours {
            Ok(())
        } else {
            Err(IneligibleReason::TooLate {
                hours_remaining,
                threshold_hours,
            })
        }
    }

    pub fn is_cancellable(&self, appointment: &Appointment, now: NaiveDateTime) -> bool {
        self.cancellation_eligibility(appointment, now).is_ok()
    }

    pub fn cancel(
        &self,
        appointment: &Appointment,
        now: NaiveDateTime,
    ) -> Result<Appointment, LifecycleError> {
        self.cancellation_eligibility(appointment, now)
            .map_err(LifecycleError::IneligibleCancellation)?;
        Ok(Appointment {
            status: AppointmentStatus::Cancelled,
            ..appointment.clone()
        })
    }
}

// ─── Completion ───────────────────────────────────────────────────────────────

/// Records the outcome of a consultation.
///
/// The diagnosis is stored trimmed. Blank recommendations are stored as
/// `None`.
pub fn complete(
    appointment: &Appointment,
    diagnosis: &str,
    recommendations: &str,
) -> Result<Appointment, LifecycleError> {
    match appointment.status {
        AppointmentStatus::Scheduled => {}
        status @ (AppointmentStatus::Active
        | AppointmentStatus::Completed
        | AppointmentStatus::Cancelled) => {
            return Err(ValidationError::NotScheduled { status }.into());
        }
    }

    let diagnosis = diagnosis.trim();
    if diagnosis.is_empty() {
        return Err(ValidationError::DiagnosisRequired.into());
    }

    let recommendations = recommendations.trim();
    Ok(Appointment {
        status: AppointmentStatus::Completed,
        diagnosis: Some(diagnosis.to_string()),
        recommendations: (!recommendations.is_empty()).then(|| recommendations.to_string()),
        ..appointment.clone()
    })
}

// ─── Default-policy shorthands ────────────────────────────────────────────────

pub fn is_booking_window_valid(candidate: NaiveDateTime, now: NaiveDateTime) -> bool {
    LifecyclePolicy::default().is_booking_window_valid(candidate, now)
}

pub fn is_cancellable(appointment: &Appointment, now: NaiveDateTime) -> bool {
    LifecyclePolicy::default().is_cancellable(appointment, now)
}

pub fn cancel(appointment: &Appointment, now: NaiveDateTime) -> Result<Appointment, LifecycleError> {
    LifecyclePolicy::default().cancel(appointment, now)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentId;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 4)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn appointment_at(scheduled_at: NaiveDateTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: AppointmentId::from(1),
            patient_name: "Juan Pérez".into(),
            specialty: "Cardiología".into(),
            assigned_provider: "Dr. Juan Pérez".into(),
            scheduled_at,
            status,
            diagnosis: None,
            recommendations: None,
        }
    }

    fn scheduled_in(delta: TimeDelta) -> Appointment {
        appointment_at(now() + delta, AppointmentStatus::Scheduled)
    }

    // ── Booking window ──

    #[test]
    fn booking_lower_bound() {
        let day = TimeDelta::days(1);
        let sec = TimeDelta::seconds(1);
        assert!(!is_booking_window_valid(now() + day - sec, now()));
        assert!(is_booking_window_valid(now() + day + sec, now()));
    }

    #[test]
    fn booking_upper_bound() {
        let month = TimeDelta::days(30);
        let sec = TimeDelta::seconds(1);
        assert!(is_booking_window_valid(now() + month - sec, now()));
        assert!(!is_booking_window_valid(now() + month + sec, now()));
    }

    #[test]
    fn booking_window_endpoints_are_inclusive() {
        assert!(is_booking_window_valid(now() + TimeDelta::days(1), now()));
        assert!(is_booking_window_valid(now() + TimeDelta::days(30), now()));
    }

    #[test]
    fn booking_in_the_past_is_rejected() {
        assert!(!is_booking_window_valid(now() - TimeDelta::days(2), now()));
        assert!(!is_booking_window_valid(now(), now()));
    }

    #[test]
    fn validate_booking_reports_window() {
        let policy = LifecyclePolicy::default();
        let candidate = now() + TimeDelta::days(45);
        let err = policy.validate_booking(candidate, now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutsideBookingWindow {
                candidate,
                earliest: now() + TimeDelta::days(1),
                latest: now() + TimeDelta::days(30),
            }
        );
    }

    #[test]
    fn booking_window_near_calendar_end_is_closed() {
        let end = NaiveDateTime::MAX - TimeDelta::days(10);
        assert!(!is_booking_window_valid(NaiveDateTime::MAX, end));
        assert_eq!(
            LifecyclePolicy::default().validate_booking(NaiveDateTime::MAX, end),
            Err(ValidationError::NoBookingWindow { now: end })
        );
    }

    #[test]
    fn huge_max_days_does_not_panic() {
        let policy = LifecyclePolicy {
            booking_max_days: i64::MAX,
            ..LifecyclePolicy::default()
        };
        assert!(policy.booking_window(now()).is_none());
        assert!(!policy.is_booking_window_valid(now() + TimeDelta::days(2), now()));
    }

    #[test]
    fn negative_min_days_does_not_open_the_past() {
        let policy = LifecyclePolicy {
            booking_min_days: -5,
            ..LifecyclePolicy::default()
        };
        assert!(!policy.is_booking_window_valid(now() - TimeDelta::days(2), now()));
        assert!(policy.is_booking_window_valid(now() + TimeDelta::hours(1), now()));
    }

    // ── Cancellation ──

    #[test]
    fn cancellable_with_25_hours_left() {
        let appt = scheduled_in(TimeDelta::hours(25));
        assert!(is_cancellable(&appt, now()));

        let cancelled = cancel(&appt, now()).unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert_eq!(cancelled.id, appt.id);

        let again = cancel(&cancelled, now()).unwrap_err();
        assert_eq!(
            again,
            LifecycleError::IneligibleCancellation(IneligibleReason::Status(
                AppointmentStatus::Cancelled
            ))
        );
    }

    #[test]
    fn exactly_threshold_is_not_cancellable() {
        let appt = scheduled_in(TimeDelta::hours(24));
        assert!(!is_cancellable(&appt, now()));
        let err = cancel(&appt, now()).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::IneligibleCancellation(IneligibleReason::TooLate {
                hours_remaining: 24,
                threshold_hours: 24,
            })
        );
    }

    #[test]
    fn partial_hours_do_not_count() {
        // 24h59m is still 24 whole hours.
        let appt = scheduled_in(TimeDelta::hours(24) + TimeDelta::minutes(59));
        assert!(!is_cancellable(&appt, now()));
    }

    #[test]
    fn active_is_cancellable_like_scheduled() {
        let appt = appointment_at(now() + TimeDelta::days(3), AppointmentStatus::Active);
        assert!(is_cancellable(&appt, now()));
    }

    #[test]
    fn cancelled_never_cancellable() {
        for delta in [TimeDelta::hours(1), TimeDelta::days(20), TimeDelta::days(-5)] {
            let appt = appointment_at(now() + delta, AppointmentStatus::Cancelled);
            assert!(!is_cancellable(&appt, now()));
        }
    }

    #[test]
    fn completed_never_cancellable() {
        let appt = appointment_at(now() + TimeDelta::days(10), AppointmentStatus::Completed);
        assert!(!is_cancellable(&appt, now()));
    }

    #[test]
    fn past_appointment_not_cancellable() {
        let appt = scheduled_in(TimeDelta::hours(-3));
        assert!(!is_cancellable(&appt, now()));
    }

    #[test]
    fn custom_threshold() {
        let policy = LifecyclePolicy {
            cancellation_threshold_hours: 12,
            ..LifecyclePolicy::default()
        };
        let appt = scheduled_in(TimeDelta::hours(13));
        assert!(policy.is_cancellable(&appt, now()));
        assert!(!is_cancellable(&appt, now()));
    }

    #[test]
    fn negative_threshold_reads_as_zero() {
        let policy = LifecyclePolicy {
            cancellation_threshold_hours: -48,
            ..LifecyclePolicy::default()
        };
        let past = scheduled_in(TimeDelta::hours(-3));
        assert!(!policy.is_cancellable(&past, now()));
        assert_eq!(
            policy.cancellation_eligibility(&past, now()),
            Err(IneligibleReason::TooLate {
                hours_remaining: -3,
                threshold_hours: 0,
            })
        );
        assert!(policy.is_cancellable(&scheduled_in(TimeDelta::hours(2)), now()));
    }

    #[test]
    fn failed_cancel_leaves_input_untouched() {
        let appt = scheduled_in(TimeDelta::hours(2));
        let before = appt.clone();
        assert!(cancel(&appt, now()).is_err());
        assert_eq!(appt, before);
    }

    // ── Completion ──

    #[test]
    fn complete_requires_diagnosis() {
        let appt = scheduled_in(TimeDelta::hours(-1));
        for blank in ["", "   ", "\n\t"] {
            let err = complete(&appt, blank, "x").unwrap_err();
            assert_eq!(err, LifecycleError::Validation(ValidationError::DiagnosisRequired));
        }
    }

    #[test]
    fn complete_sets_outcome() {
        let appt = scheduled_in(TimeDelta::hours(-1));
        let done = complete(&appt, "flu", "rest").unwrap();
        assert_eq!(done.status, AppointmentStatus::Completed);
        assert_eq!(done.diagnosis.as_deref(), Some("flu"));
        assert_eq!(done.recommendations.as_deref(), Some("rest"));
        // input is a value, not mutated
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn complete_twice_fails() {
        let appt = scheduled_in(TimeDelta::hours(-1));
        let done = complete(&appt, "flu", "rest").unwrap();
        let err = complete(&done, "cold", "tea").unwrap_err();
        assert_eq!(
            err,
            LifecycleError::Validation(ValidationError::NotScheduled {
                status: AppointmentStatus::Completed
            })
        );
    }

    #[test]
    fn complete_cancelled_fails() {
        let appt = appointment_at(now(), AppointmentStatus::Cancelled);
        assert!(matches!(
            complete(&appt, "flu", "rest"),
            Err(LifecycleError::Validation(ValidationError::NotScheduled { .. }))
        ));
    }

    #[test]
    fn complete_trims_and_drops_blank_recommendations() {
        let appt = scheduled_in(TimeDelta::hours(-1));
        let done = complete(&appt, "  Esguince de tobillo \n", "  ").unwrap();
        assert_eq!(done.diagnosis.as_deref(), Some("Esguince de tobillo"));
        assert!(done.recommendations.is_none());
    }
}
