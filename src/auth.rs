//! Login and registration.
//!
//! Credentials are checked for blanks locally; everything else is the
//! backend's call. A successful login yields the [`Session`] every other
//! workflow takes.

use crate::backend::ClinicBackend;
use crate::error::ClinicError;
use crate::session::{Credentials, Session};

fn credentials(email: &str, password: &str) -> Result<Credentials, ClinicError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClinicError::InvalidInput("Email required".into()));
    }
    if password.is_empty() {
        return Err(ClinicError::InvalidInput("Password required".into()));
    }
    Ok(Credentials::new(email, password))
}

pub async fn login(
    backend: &dyn ClinicBackend,
    email: &str,
    password: &str,
) -> Result<Session, ClinicError> {
    let creds = credentials(email, password)?;
    let session = Session::from(backend.login(&creds).await.map_err(|e| {
        tracing::warn!(email = %creds.email, error = %e, "Login failed");
        e
    })?);
    tracing::info!(
        user_id = session.user_id(),
        role = %session.role(),
        "Logged in"
    );
    Ok(session)
}

/// Creates a patient account. The caller logs in afterwards.
pub async fn register(
    backend: &dyn ClinicBackend,
    email: &str,
    password: &str,
) -> Result<(), ClinicError> {
    let creds = credentials(email, password)?;
    backend.register(&creds).await?;
    tracing::info!(email = %creds.email, "Account registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryBackend};
    use crate::models::Role;

    #[tokio::test]
    async fn register_then_login() {
        let backend = InMemoryBackend::new();
        register(&backend, "ana@clinica.test", "secreto").await.unwrap();

        let session = login(&backend, "  ana@clinica.test ", "secreto").await.unwrap();
        assert_eq!(session.role(), Role::Patient);
        assert_eq!(session.email(), "ana@clinica.test");
    }

    #[tokio::test]
    async fn blank_fields_never_reach_backend() {
        let backend = InMemoryBackend::new();
        let err = login(&backend, "   ", "pw").await.unwrap_err();
        assert_eq!(err, ClinicError::InvalidInput("Email required".into()));
        let err = register(&backend, "ana@clinica.test", "").await.unwrap_err();
        assert_eq!(err, ClinicError::InvalidInput("Password required".into()));

        // Nothing was registered.
        let err = login(&backend, "ana@clinica.test", "x").await.unwrap_err();
        assert_eq!(err, ClinicError::Backend(BackendError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let backend = InMemoryBackend::new();
        register(&backend, "ana@clinica.test", "a").await.unwrap();
        let err = register(&backend, "ana@clinica.test", "b").await.unwrap_err();
        assert!(matches!(
            err,
            ClinicError::Backend(BackendError::AlreadyRegistered(_))
        ));
    }

    #[tokio::test]
    async fn doctor_login() {
        let backend = InMemoryBackend::new();
        backend
            .add_user("garcia@clinica.test", "pw", Role::Doctor, "Dr. García")
            .unwrap();
        let session = login(&backend, "garcia@clinica.test", "pw").await.unwrap();
        assert!(session.is_doctor());
    }
}
