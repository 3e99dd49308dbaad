use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::OrphanageId,
    error::ApiErrorBody,
    protocol::{orphanage_route, orphanages_route, OrphanageDetail, OrphanageSummary},
};
use tracing::debug;

pub mod config;
pub mod detail;
pub mod error;
pub mod form;
pub mod images;
pub mod listing;
pub mod navigation;
pub mod position;
pub mod submission;
pub mod wizard;

pub use config::{load_settings, ClientSettings};
pub use detail::{DetailLoader, DetailState};
pub use error::{ConfigError, LoadError, SubmitError};
pub use form::{OrphanageRecord, RegistrationFormModel};
pub use images::{
    AddImageOutcome, ImageRef, ImageSelectionManager, MediaPicker, MissingMediaPicker,
    PickerResult,
};
pub use listing::ListingLoader;
pub use navigation::{Navigator, Route, WizardSession};
pub use position::PositionPicker;
pub use submission::{SubmissionBuilder, SubmissionPayload};
pub use wizard::RegistrationWizard;

/// User-facing messages raised by the flows. Screens subscribe and show
/// them as alerts; nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    PermissionDenied,
    PickerFailed(String),
    OrphanageCreated,
    SubmissionFailed(String),
    ListingLoadFailed(String),
}

impl Notification {
    pub fn message(&self) -> String {
        match self {
            Notification::PermissionDenied => {
                "We need access to your photos to attach images.".to_string()
            }
            Notification::PickerFailed(reason) => format!("Could not open photos: {reason}"),
            Notification::OrphanageCreated => "Orphanage registered.".to_string(),
            Notification::SubmissionFailed(reason)
            | Notification::ListingLoadFailed(reason) => reason.clone(),
        }
    }
}

/// Backend endpoints the app consumes.
#[async_trait]
pub trait OrphanageApi: Send + Sync {
    async fn list_orphanages(&self) -> Result<Vec<OrphanageSummary>, LoadError>;
    async fn get_orphanage(&self, id: OrphanageId) -> Result<OrphanageDetail, LoadError>;
    async fn create_orphanage(&self, payload: SubmissionPayload) -> Result<(), SubmitError>;
}

pub struct HttpOrphanageApi {
    http: Client,
    base_url: String,
}

impl HttpOrphanageApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config::normalize_base_url(&settings.api_base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }
}

#[async_trait]
impl OrphanageApi for HttpOrphanageApi {
    async fn list_orphanages(&self) -> Result<Vec<OrphanageSummary>, LoadError> {
        let response = self
            .http
            .get(self.url(orphanages_route()))
            .send()
            .await
            .map_err(|err| LoadError::Network(err.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|(status, message)| LoadError::Server { status, message })?;
        response
            .json()
            .await
            .map_err(|err| LoadError::Decode(err.to_string()))
    }

    async fn get_orphanage(&self, id: OrphanageId) -> Result<OrphanageDetail, LoadError> {
        let response = self
            .http
            .get(self.url(&orphanage_route(id)))
            .send()
            .await
            .map_err(|err| LoadError::Network(err.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|(status, message)| LoadError::Server { status, message })?;
        response
            .json()
            .await
            .map_err(|err| LoadError::Decode(err.to_string()))
    }

    async fn create_orphanage(&self, payload: SubmissionPayload) -> Result<(), SubmitError> {
        let form = payload.into_form().await?;
        let response = self
            .http
            .post(self.url(orphanages_route()))
            .multipart(form)
            .send()
            .await
            .map_err(|err| SubmitError::Network(err.to_string()))?;
        let response = check_status(response)
            .await
            .map_err(|(status, message)| SubmitError::Server { status, message })?;
        debug!(status = response.status().as_u16(), "orphanage creation accepted");
        Ok(())
    }
}

/// Passes 2xx responses through; otherwise yields the status and the
/// backend's own message when the body carries one.
async fn check_status(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = ApiErrorBody::message_from_body(&body)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    Err((status.as_u16(), message))
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
