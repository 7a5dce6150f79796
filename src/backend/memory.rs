//! In-process clinic backend.
//!
//! Stands in for the remote service in tests and offline demos. Every
//! availability search gets the same answer: the requested day at 10:00 with
//! the clinic's default provider.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::{AvailabilityQuery, BackendError, ClinicBackend, Outcome};
use crate::config::APPOINTMENT_DURATION_MINUTES;
use crate::models::{Appointment, AppointmentId, AppointmentStatus, Role, Slot, Specialty};
use crate::session::{Credentials, LoginResponse, Session};

const DEFAULT_PROVIDER: &str = "Dr. García";

struct StoredUser {
    id: String,
    password: String,
    role: Role,
    display_name: String,
}

struct Record {
    appointment: Appointment,
    patient_id: String,
}

#[derive(Default)]
struct MemoryState {
    /// Keyed by email.
    users: HashMap<String, StoredUser>,
    records: Vec<Record>,
    blocked: HashSet<Specialty>,
    next_user_id: u64,
    next_appointment_id: u64,
}

impl MemoryState {
    fn user_by_id(&self, id: &str) -> Option<&StoredUser> {
        self.users.values().find(|u| u.id == id)
    }

    fn record_mut(&mut self, id: &AppointmentId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| &r.appointment.id == id)
    }

    fn contains(&self, id: &AppointmentId) -> bool {
        self.records.iter().any(|r| &r.appointment.id == id)
    }

    /// Next numeric id not already taken.
    fn assign_id(&mut self) -> AppointmentId {
        loop {
            self.next_appointment_id += 1;
            let id = AppointmentId::from(self.next_appointment_id);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
    provider: String,
    slot_time: NaiveTime,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            provider: DEFAULT_PROVIDER.to_string(),
            slot_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        }
    }

    /// Name offered on every availability answer.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> Result<R, BackendError>,
    ) -> Result<R, BackendError> {
        let mut state = self.state.lock().map_err(|_| BackendError::LockPoisoned)?;
        f(&mut state)
    }

    /// Creates an account and returns its id.
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
        display_name: &str,
    ) -> Result<String, BackendError> {
        self.with_state(|state| {
            if state.users.contains_key(email) {
                return Err(BackendError::AlreadyRegistered(email.to_string()));
            }
            state.next_user_id += 1;
            let id = state.next_user_id.to_string();
            state.users.insert(
                email.to_string(),
                StoredUser {
                    id: id.clone(),
                    password: password.to_string(),
                    role,
                    display_name: display_name.to_string(),
                },
            );
            Ok(id)
        })
    }

    /// Stores an appointment as-is for a patient. A missing id is assigned;
    /// an id already in use is rejected.
    pub fn insert_appointment(
        &self,
        patient_id: &str,
        mut appointment: Appointment,
    ) -> Result<AppointmentId, BackendError> {
        self.with_state(|state| {
            if appointment.id.as_str().is_empty() {
                appointment.id = state.assign_id();
            } else if state.contains(&appointment.id) {
                return Err(BackendError::DuplicateId(appointment.id));
            } else if let Ok(n) = appointment.id.as_str().parse::<u64>() {
                state.next_appointment_id = state.next_appointment_id.max(n);
            }
            let id = appointment.id.clone();
            state.records.push(Record {
                appointment,
                patient_id: patient_id.to_string(),
            });
            Ok(id)
        })
    }

    /// Makes availability searches for `specialty` come back empty.
    pub fn block_specialty(&self, specialty: Specialty) -> Result<(), BackendError> {
        self.with_state(|state| {
            state.blocked.insert(specialty);
            Ok(())
        })
    }

    pub fn appointment(&self, id: &AppointmentId) -> Result<Option<Appointment>, BackendError> {
        self.with_state(|state| {
            Ok(state
                .records
                .iter()
                .find(|r| &r.appointment.id == id)
                .map(|r| r.appointment.clone()))
        })
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClinicBackend for InMemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        self.with_state(|state| {
            let user = state
                .users
                .get(&credentials.email)
                .filter(|u| u.password == credentials.password)
                .ok_or(BackendError::InvalidCredentials)?;
            Ok(LoginResponse {
                id: user.id.clone(),
                email: credentials.email.clone(),
                role: user.role,
                estado: "activo".into(),
                tipo: user.role.as_str().into(),
            })
        })
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), BackendError> {
        self.add_user(
            &credentials.email,
            &credentials.password,
            Role::Patient,
            &credentials.email,
        )
        .map(|_| ())
    }

    async fn search_availability(&self, query: &AvailabilityQuery) -> Result<Slot, BackendError> {
        self.with_state(|state| {
            let date = query.requested_at.date();
            if state.blocked.contains(&query.specialty) {
                return Err(BackendError::NoAvailability {
                    specialty: query.specialty,
                    date,
                });
            }
            Ok(Slot {
                scheduled_at: date.and_time(self.slot_time),
                specialty: query.specialty,
                provider: self.provider.clone(),
                duration_minutes: APPOINTMENT_DURATION_MINUTES,
            })
        })
    }

    async fn confirm_appointment(
        &self,
        session: &Session,
        slot: &Slot,
    ) -> Result<Appointment, BackendError> {
        self.with_state(|state| {
            let patient_name = state
                .user_by_id(session.user_id())
                .map(|u| u.display_name.clone())
                .unwrap_or_else(|| session.email().to_string());

            let appointment = Appointment {
                id: state.assign_id(),
                patient_name,
                specialty: slot.specialty.label().to_string(),
                assigned_provider: slot.provider.clone(),
                scheduled_at: slot.scheduled_at,
                status: AppointmentStatus::Scheduled,
                diagnosis: None,
                recommendations: None,
            };
            state.records.push(Record {
                appointment: appointment.clone(),
                patient_id: session.user_id().to_string(),
            });
            Ok(appointment)
        })
    }

    async fn list_appointments(&self, session: &Session) -> Result<Vec<Appointment>, BackendError> {
        self.with_state(|state| {
            let mut list: Vec<Appointment> = state
                .records
                .iter()
                .filter(|r| r.patient_id == session.user_id())
                .map(|r| r.appointment.clone())
                .collect();
            list.sort_by_key(|a| a.scheduled_at);
            Ok(list)
        })
    }

    async fn daily_agenda(
        &self,
        session: &Session,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, BackendError> {
        self.with_state(|state| {
            let name = state
                .user_by_id(session.user_id())
                .map(|u| u.display_name.clone())
                .unwrap_or_default();
            let mut list: Vec<Appointment> = state
                .records
                .iter()
                .map(|r| &r.appointment)
                .filter(|a| a.assigned_provider == name && a.scheduled_at.date() == day)
                .cloned()
                .collect();
            list.sort_by_key(|a| a.scheduled_at);
            Ok(list)
        })
    }

    async fn cancel_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
    ) -> Result<Appointment, BackendError> {
        self.with_state(|state| {
            let record = state
                .record_mut(id)
                .filter(|r| r.patient_id == session.user_id())
                .ok_or_else(|| BackendError::NotFound(id.clone()))?;

            let status = record.appointment.status;
            if status.is_terminal() {
                return Err(BackendError::Conflict {
                    id: id.clone(),
                    status,
                });
            }
            record.appointment.status = AppointmentStatus::Cancelled;
            Ok(record.appointment.clone())
        })
    }

    async fn complete_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
        outcome: &Outcome,
    ) -> Result<Appointment, BackendError> {
        self.with_state(|state| {
            let name = state
                .user_by_id(session.user_id())
                .map(|u| u.display_name.clone())
                .unwrap_or_default();
            let record = state
                .record_mut(id)
                .filter(|r| r.appointment.assigned_provider == name)
                .ok_or_else(|| BackendError::NotFound(id.clone()))?;

            let status = record.appointment.status;
            if status != AppointmentStatus::Scheduled {
                return Err(BackendError::Conflict {
                    id: id.clone(),
                    status,
                });
            }
            record.appointment.status = AppointmentStatus::Completed;
            record.appointment.diagnosis = Some(outcome.diagnosis.clone());
            record.appointment.recommendations = outcome.recommendations.clone();
            Ok(record.appointment.clone())
        })
    }
}
