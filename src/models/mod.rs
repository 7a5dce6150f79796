pub mod appointment;
pub mod enums;
pub mod filters;

pub use appointment::{Appointment, AppointmentId, Slot};
pub use enums::{AppointmentStatus, Role, Specialty};
pub use filters::AppointmentFilter;

/// A string from the backend or a caller did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}
