//! Fakes for the seam traits, shared by the unit test modules.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::OrphanageId,
    protocol::{OrphanageDetail, OrphanageSummary},
};
use tokio::sync::{broadcast, Notify};

use crate::{
    error::{LoadError, SubmitError},
    images::{ImageRef, MediaPicker, PickerResult},
    navigation::{Navigator, Route},
    submission::SubmissionPayload,
    Notification, OrphanageApi,
};

pub struct ScriptedPicker {
    permission: Result<bool, String>,
    picks: StdMutex<VecDeque<Result<PickerResult, String>>>,
    pub pick_calls: AtomicUsize,
}

impl ScriptedPicker {
    pub fn granting(picks: Vec<Result<PickerResult, String>>) -> Self {
        Self {
            permission: Ok(true),
            picks: StdMutex::new(picks.into()),
            pick_calls: AtomicUsize::new(0),
        }
    }

    pub fn selecting(uris: &[&str]) -> Self {
        Self::granting(
            uris.iter()
                .map(|uri| Ok(PickerResult::Selected(ImageRef::new(*uri))))
                .collect(),
        )
    }

    pub fn denying() -> Self {
        Self {
            permission: Ok(false),
            picks: StdMutex::new(VecDeque::new()),
            pick_calls: AtomicUsize::new(0),
        }
    }

    pub fn broken_permission(err: &str) -> Self {
        Self {
            permission: Err(err.to_string()),
            picks: StdMutex::new(VecDeque::new()),
            pick_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MediaPicker for ScriptedPicker {
    async fn request_permission(&self) -> Result<bool> {
        self.permission.clone().map_err(|err| anyhow!(err))
    }

    async fn pick_image(&self) -> Result<PickerResult> {
        self.pick_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.picks.lock().expect("picks").pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Ok(PickerResult::Cancelled),
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: StdMutex<Vec<Route>>,
    pub back_calls: AtomicUsize,
}

impl RecordingNavigator {
    pub fn route_names(&self) -> Vec<&'static str> {
        self.routes
            .lock()
            .expect("routes")
            .iter()
            .map(Route::name)
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes").push(route);
    }

    fn go_back(&self) {
        self.back_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory backend. Creation outcomes are scripted; once the script runs
/// out every creation succeeds and is appended to the listing.
#[derive(Default)]
pub struct FakeApi {
    pub listing: StdMutex<Vec<OrphanageSummary>>,
    pub details: StdMutex<Vec<OrphanageDetail>>,
    pub submissions: StdMutex<Vec<SubmissionPayload>>,
    create_failures: StdMutex<VecDeque<String>>,
    list_failures: StdMutex<VecDeque<String>>,
    /// When set, creation waits for a permit before answering.
    create_gate: Option<Arc<Notify>>,
}

impl FakeApi {
    pub fn failing_creates(messages: &[&str]) -> Self {
        let api = Self::default();
        api.create_failures
            .lock()
            .expect("failures")
            .extend(messages.iter().map(|m| m.to_string()));
        api
    }

    pub fn with_create_gate(mut self, gate: Arc<Notify>) -> Self {
        self.create_gate = Some(gate);
        self
    }

    pub fn fail_next_list(&self, message: &str) {
        self.list_failures
            .lock()
            .expect("failures")
            .push_back(message.to_string());
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().expect("submissions").len()
    }
}

#[async_trait]
impl OrphanageApi for FakeApi {
    async fn list_orphanages(&self) -> Result<Vec<OrphanageSummary>, LoadError> {
        if let Some(message) = self.list_failures.lock().expect("failures").pop_front() {
            return Err(LoadError::Network(message));
        }
        Ok(self.listing.lock().expect("listing").clone())
    }

    async fn get_orphanage(&self, id: OrphanageId) -> Result<OrphanageDetail, LoadError> {
        self.details
            .lock()
            .expect("details")
            .iter()
            .find(|detail| detail.id == id)
            .cloned()
            .ok_or_else(|| LoadError::Server {
                status: 404,
                message: "Orphanage not found".to_string(),
            })
    }

    async fn create_orphanage(&self, payload: SubmissionPayload) -> Result<(), SubmitError> {
        self.submissions
            .lock()
            .expect("submissions")
            .push(payload.clone());
        if let Some(gate) = &self.create_gate {
            gate.notified().await;
        }
        if let Some(message) = self.create_failures.lock().expect("failures").pop_front() {
            return Err(SubmitError::Server {
                status: 500,
                message,
            });
        }

        let mut listing = self.listing.lock().expect("listing");
        let id = OrphanageId(listing.len() as i64 + 1);
        listing.push(OrphanageSummary {
            id,
            name: payload.text_value("name").unwrap_or_default().to_string(),
            latitude: payload
                .text_value("latitude")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            longitude: payload
                .text_value("longitude")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        });
        Ok(())
    }
}

pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        seen.push(notification);
    }
    seen
}
