use crate::authorization::AuthorizationError;
use crate::backend::BackendError;
use crate::lifecycle::{LifecycleError, ValidationError};

/// Error returned by the workflow layer (auth, booking, patient list, agenda).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClinicError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Access denied: {0}")]
    Authorization(#[from] AuthorizationError),
    #[error("Booking flow: {0}")]
    BookingState(String),
}

impl From<ValidationError> for ClinicError {
    fn from(err: ValidationError) -> Self {
        Self::Lifecycle(LifecycleError::Validation(err))
    }
}

impl ClinicError {
    /// True when the caller can fix the input and retry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Lifecycle(LifecycleError::Validation(_))
        )
    }
}
