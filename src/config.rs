use std::time::Duration;

use crate::lifecycle::LifecyclePolicy;

/// Application-level constants
pub const APP_NAME: &str = "Salud Total";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local development backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Default HTTP request timeout for backend calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Earliest bookable slot, in days from now.
pub const BOOKING_MIN_DAYS: i64 = 1;

/// Latest bookable slot, in days from now.
pub const BOOKING_MAX_DAYS: i64 = 30;

/// Lead time a patient must leave before cancelling. Strict: exactly this
/// many hours is too late.
pub const CANCELLATION_THRESHOLD_HOURS: i64 = 24;

/// Every consultation is booked as a fixed 20-minute slot.
pub const APPOINTMENT_DURATION_MINUTES: i64 = 20;

pub const ENV_API_URL: &str = "SALUD_TOTAL_API_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SALUD_TOTAL_HTTP_TIMEOUT_SECS";
pub const ENV_CANCEL_THRESHOLD_HOURS: &str = "SALUD_TOTAL_CANCEL_THRESHOLD_HOURS";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "salud_total=info,warn"
}

/// Runtime configuration for the client side of the clinic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub api_base_url: String,
    pub http_timeout: Duration,
    pub policy: LifecyclePolicy,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            policy: LifecyclePolicy::default(),
        }
    }
}

impl ClinicConfig {
    /// Build a config from `SALUD_TOTAL_*` environment variables.
    ///
    /// Unset variables keep their defaults. Unparseable values are logged
    /// and ignored rather than failing startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClinicConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let trimmed = url.trim();
            if trimmed.is_empty() {
                tracing::warn!(var = ENV_API_URL, "Empty API URL, using default");
            } else {
                config.api_base_url = trimmed.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(var = ENV_HTTP_TIMEOUT_SECS, value = %raw, "Invalid timeout, using default"),
            }
        }

        if let Some(raw) = lookup(ENV_CANCEL_THRESHOLD_HOURS) {
            match raw.trim().parse::<i64>() {
                Ok(hours) if hours >= 0 => config.policy.cancellation_threshold_hours = hours,
                _ => tracing::warn!(var = ENV_CANCEL_THRESHOLD_HOURS, value = %raw, "Invalid threshold, using default"),
            }
        }

        config
    }
}
