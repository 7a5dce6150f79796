pub mod config;
pub mod error;
pub mod models;
pub mod lifecycle; // Booking window, cancellation, completion rules
pub mod session;
pub mod authorization;
pub mod backend; // Remote clinic service port + adapters
pub mod auth;
pub mod booking; // Patient: new appointment
pub mod appointments; // Patient: list + cancel
pub mod agenda; // Doctor: daily agenda + diagnosis

pub use backend::{ClinicBackend, HttpBackend, InMemoryBackend};
pub use config::ClinicConfig;
pub use error::ClinicError;
pub use session::Session;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over the
/// default filter. Safe to call more than once.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
