use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{AppointmentStatus, Specialty};
use crate::config::APPOINTMENT_DURATION_MINUTES;

/// Backend-assigned appointment identifier.
///
/// The backend has used both numeric and string ids; both decode to the same
/// opaque value and always serialize as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AppointmentId(String);

impl AppointmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for AppointmentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for AppointmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for AppointmentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// One consultation between a patient and a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_name: String,
    pub specialty: String,
    pub assigned_provider: String,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl Appointment {
    /// When the fixed-length consultation ends.
    pub fn ends_at(&self) -> NaiveDateTime {
        self.scheduled_at + TimeDelta::minutes(APPOINTMENT_DURATION_MINUTES)
    }

    /// Whole hours from `now` until the appointment, truncated toward zero.
    /// Negative once the appointment is in the past.
    pub fn hours_until(&self, now: NaiveDateTime) -> i64 {
        (self.scheduled_at - now).num_hours()
    }
}

/// A bookable time offered by the backend's availability search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub scheduled_at: NaiveDateTime,
    pub specialty: Specialty,
    pub provider: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
}

fn default_duration() -> i64 {
    APPOINTMENT_DURATION_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn id_decodes_numbers_and_strings() {
        let numeric: AppointmentId = serde_json::from_str("42").unwrap();
        let text: AppointmentId = serde_json::from_str("\"cita-42\"").unwrap();
        assert_eq!(numeric, AppointmentId::from(42));
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "cita-42");
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "\"42\"");
    }

    #[test]
    fn appointment_decodes_backend_payload() {
        let json = r#"{
            "id": 2,
            "patientName": "María García",
            "specialty": "Dermatología",
            "assignedProvider": "Dra. Ana García",
            "scheduledAt": "2023-06-15T10:00:00",
            "status": "COMPLETADA",
            "diagnosis": "Dermatitis atópica",
            "recommendations": "Aplicar crema hidratante dos veces al día"
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.id.as_str(), "2");
        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert_eq!(appt.scheduled_at, at(2023, 6, 15, 10, 0));
        assert_eq!(appt.diagnosis.as_deref(), Some("Dermatitis atópica"));
    }

    #[test]
    fn optional_clinical_fields_default_to_none() {
        let json = r#"{
            "id": "a1",
            "patientName": "Juan Pérez",
            "specialty": "Cardiología",
            "assignedProvider": "Dr. García",
            "scheduledAt": "2023-06-15T09:00:00",
            "status": "PROGRAMADA"
        }"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert!(appt.diagnosis.is_none());
        assert!(appt.recommendations.is_none());
        let back = serde_json::to_value(&appt).unwrap();
        assert!(back.get("diagnosis").is_none());
    }

    #[test]
    fn consultation_lasts_twenty_minutes() {
        let appt = Appointment {
            id: AppointmentId::from(1),
            patient_name: "Juan Pérez".into(),
            specialty: "Cardiología".into(),
            assigned_provider: "Dr. García".into(),
            scheduled_at: at(2023, 6, 15, 9, 0),
            status: AppointmentStatus::Scheduled,
            diagnosis: None,
            recommendations: None,
        };
        assert_eq!(appt.ends_at(), at(2023, 6, 15, 9, 20));
    }

    #[test]
    fn hours_until_truncates() {
        let appt = Appointment {
            id: AppointmentId::from(1),
            patient_name: "Juan Pérez".into(),
            specialty: "Cardiología".into(),
            assigned_provider: "Dr. García".into(),
            scheduled_at: at(2024, 11, 6, 10, 0),
            status: AppointmentStatus::Active,
            diagnosis: None,
            recommendations: None,
        };
        assert_eq!(appt.hours_until(at(2024, 11, 5, 9, 15)), 24);
        assert_eq!(appt.hours_until(at(2024, 11, 6, 11, 0)), -1);
    }

    #[test]
    fn slot_duration_defaults() {
        let json = r#"{"scheduledAt":"2024-11-20T10:00:00","specialty":"general","provider":"Dr. García"}"#;
        let slot: Slot = serde_json::from_str(json).unwrap();
        assert_eq!(slot.duration_minutes, 20);
        assert_eq!(slot.specialty, Specialty::General);
    }
}
