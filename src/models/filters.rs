use chrono::NaiveDate;

use super::appointment::Appointment;
use super::enums::AppointmentStatus;

/// Patient-side listing filter. Empty fields match everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    /// Same calendar day (ignoring time) and same status, when set.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        let date_ok = self
            .date
            .map_or(true, |d| appointment.scheduled_at.date() == d);
        let status_ok = self.status.map_or(true, |s| appointment.status == s);
        date_ok && status_ok
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.status.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn apply<'a>(&self, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
        appointments.iter().filter(|a| self.matches(a)).collect()
    }
}
