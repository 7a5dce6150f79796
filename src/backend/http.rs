use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{AvailabilityQuery, BackendError, ClinicBackend, Outcome};
use crate::config::ClinicConfig;
use crate::models::{Appointment, AppointmentId, AppointmentStatus, Slot};
use crate::session::{Credentials, LoginResponse, Session};

/// Header carrying the logged-in user's backend id on session-bound calls.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Whatever a 409 body tells us about the appointment's current state.
#[derive(Deserialize)]
struct ConflictBody {
    #[serde(default)]
    status: Option<AppointmentStatus>,
}

/// Clinic backend reached over HTTP/JSON.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn from_config(config: &ClinicConfig) -> Result<Self, BackendError> {
        Self::new(&config.api_base_url, config.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/appointments/{id}/{action}` with `id` as a single
    /// percent-encoded path segment.
    fn appointment_url(&self, id: &AppointmentId, action: &str) -> Result<Url, BackendError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| BackendError::HttpClient(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::HttpClient(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("appointments")
            .push(id.as_str())
            .push(action);
        Ok(url)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.header(USER_ID_HEADER, session.user_id())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        builder.send().await.map_err(|e| {
            if e.is_connect() {
                BackendError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                BackendError::Timeout(self.timeout_secs)
            } else {
                BackendError::HttpClient(e.to_string())
            }
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    async fn status_error(response: Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status, body = %body, "Clinic backend returned an error");
        BackendError::Status { status, body }
    }

    /// Maps 404/409 on an appointment route to typed errors. A 409 is always
    /// a conflict; its body only decides whether the current status is known.
    async fn appointment_error(response: Response, id: &AppointmentId) -> BackendError {
        match response.status() {
            StatusCode::NOT_FOUND => BackendError::NotFound(id.clone()),
            StatusCode::CONFLICT => {
                let body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<ConflictBody>(&body)
                    .ok()
                    .and_then(|b| b.status)
                {
                    Some(status) => BackendError::Conflict {
                        id: id.clone(),
                        status,
                    },
                    None => {
                        tracing::warn!(appointment_id = %id, body = %body, "Conflict without a status");
                        BackendError::ConflictUnknownStatus(id.clone())
                    }
                }
            }
            _ => Self::status_error(response).await,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(builder).await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Self::decode(response).await
    }
}

#[async_trait]
impl ClinicBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        let response = self
            .send(self.client.post(self.url("/login")).json(credentials))
            .await?;

        match response.status() {
            s if s.is_success() => Self::decode(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(BackendError::InvalidCredentials)
            }
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), BackendError> {
        let response = self
            .send(self.client.post(self.url("/register")).json(credentials))
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(BackendError::AlreadyRegistered(credentials.email.clone())),
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn search_availability(&self, query: &AvailabilityQuery) -> Result<Slot, BackendError> {
        let response = self
            .send(self.client.post(self.url("/availability")).json(query))
            .await?;

        match response.status() {
            s if s.is_success() => Self::decode(response).await,
            StatusCode::NOT_FOUND => Err(BackendError::NoAvailability {
                specialty: query.specialty,
                date: query.requested_at.date(),
            }),
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn confirm_appointment(
        &self,
        session: &Session,
        slot: &Slot,
    ) -> Result<Appointment, BackendError> {
        let builder = self.client.post(self.url("/appointments")).json(slot);
        self.fetch(self.authed(builder, session)).await
    }

    async fn list_appointments(&self, session: &Session) -> Result<Vec<Appointment>, BackendError> {
        let builder = self
            .client
            .get(self.url("/appointments"))
            .query(&[("patient_id", session.user_id())]);
        self.fetch(self.authed(builder, session)).await
    }

    async fn daily_agenda(
        &self,
        session: &Session,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, BackendError> {
        let date = day.format("%Y-%m-%d").to_string();
        let builder = self
            .client
            .get(self.url("/agenda"))
            .query(&[("doctor_id", session.user_id()), ("date", date.as_str())]);
        self.fetch(self.authed(builder, session)).await
    }

    async fn cancel_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
    ) -> Result<Appointment, BackendError> {
        let builder = self.client.post(self.appointment_url(id, "cancel")?);
        let response = self.send(self.authed(builder, session)).await?;
        if !response.status().is_success() {
            return Err(Self::appointment_error(response, id).await);
        }
        Self::decode(response).await
    }

    async fn complete_appointment(
        &self,
        session: &Session,
        id: &AppointmentId,
        outcome: &Outcome,
    ) -> Result<Appointment, BackendError> {
        let builder = self
            .client
            .post(self.appointment_url(id, "complete")?)
            .json(outcome);
        let response = self.send(self.authed(builder, session)).await?;
        if !response.status().is_success() {
            return Err(Self::appointment_error(response, id).await);
        }
        Self::decode(response).await
    }
}
