use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use crate::Notification;

/// Handle to an image on the local device that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Handle for a file on this machine, as a `file://` URI.
    pub fn from_path(path: &Path) -> Option<Self> {
        Url::from_file_path(path).ok().map(|url| Self(url.into()))
    }

    /// Filesystem path behind the handle. `file:` URIs are percent-decoded;
    /// anything else is taken as a plain path.
    pub fn local_path(&self) -> PathBuf {
        if self.0.starts_with("file:") {
            if let Some(path) = Url::parse(&self.0)
                .ok()
                .and_then(|url| url.to_file_path().ok())
            {
                return path;
            }
        }
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResult {
    Selected(ImageRef),
    Cancelled,
}

/// Device media library access.
#[async_trait]
pub trait MediaPicker: Send + Sync {
    async fn request_permission(&self) -> Result<bool>;
    async fn pick_image(&self) -> Result<PickerResult>;
}

pub struct MissingMediaPicker;

#[async_trait]
impl MediaPicker for MissingMediaPicker {
    async fn request_permission(&self) -> Result<bool> {
        Err(anyhow!("media picker is unavailable"))
    }

    async fn pick_image(&self) -> Result<PickerResult> {
        Err(anyhow!("media picker is unavailable"))
    }
}

/// Result of one run of the permission + picker flow, before it touches the
/// collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickFlow {
    Picked(ImageRef),
    Cancelled,
    PermissionDenied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddImageOutcome {
    Added(ImageRef),
    Duplicate(ImageRef),
    Cancelled,
    PermissionDenied,
    Failed,
}

/// The device-facing half of image selection. Holds no collection state so it
/// can run without borrowing the screen.
#[derive(Clone)]
pub struct PickerSession {
    picker: Arc<dyn MediaPicker>,
    events: broadcast::Sender<Notification>,
}

impl PickerSession {
    pub fn new(picker: Arc<dyn MediaPicker>, events: broadcast::Sender<Notification>) -> Self {
        Self { picker, events }
    }

    /// Denial (or a failed request) publishes exactly one notification.
    pub async fn request_permission(&self) -> bool {
        self.permission_blocker().await.is_none()
    }

    async fn permission_blocker(&self) -> Option<PickFlow> {
        match self.picker.request_permission().await {
            Ok(true) => None,
            Ok(false) => {
                warn!("media library permission denied");
                let _ = self.events.send(Notification::PermissionDenied);
                Some(PickFlow::PermissionDenied)
            }
            Err(err) => {
                warn!(error = %err, "media library permission request failed");
                let _ = self
                    .events
                    .send(Notification::PickerFailed(err.to_string()));
                Some(PickFlow::Failed)
            }
        }
    }

    pub async fn pick_image(&self) -> PickFlow {
        match self.picker.pick_image().await {
            Ok(PickerResult::Selected(image)) => PickFlow::Picked(image),
            Ok(PickerResult::Cancelled) => {
                debug!("image picker dismissed");
                PickFlow::Cancelled
            }
            Err(err) => {
                warn!(error = %err, "image picker failed");
                let _ = self
                    .events
                    .send(Notification::PickerFailed(err.to_string()));
                PickFlow::Failed
            }
        }
    }

    pub async fn run(&self) -> PickFlow {
        match self.permission_blocker().await {
            Some(blocked) => blocked,
            None => self.pick_image().await,
        }
    }
}

/// Ordered set of images chosen for the orphanage being registered.
pub struct ImageSelectionManager {
    session: PickerSession,
    images: Vec<ImageRef>,
}

impl ImageSelectionManager {
    pub fn new(picker: Arc<dyn MediaPicker>, events: broadcast::Sender<Notification>) -> Self {
        Self {
            session: PickerSession::new(picker, events),
            images: Vec::new(),
        }
    }

    pub fn picker_session(&self) -> PickerSession {
        self.session.clone()
    }

    pub async fn request_permission(&self) -> bool {
        self.session.request_permission().await
    }

    pub async fn pick_image(&self) -> PickFlow {
        self.session.pick_image().await
    }

    /// Full add flow: permission, picker, then append.
    pub async fn add_from_picker(&mut self) -> AddImageOutcome {
        let flow = self.session.run().await;
        self.apply(flow)
    }

    pub fn apply(&mut self, flow: PickFlow) -> AddImageOutcome {
        match flow {
            PickFlow::Picked(image) => {
                if self.add_image(image.clone()) {
                    AddImageOutcome::Added(image)
                } else {
                    AddImageOutcome::Duplicate(image)
                }
            }
            PickFlow::Cancelled => AddImageOutcome::Cancelled,
            PickFlow::PermissionDenied => AddImageOutcome::PermissionDenied,
            PickFlow::Failed => AddImageOutcome::Failed,
        }
    }

    /// Appends `image`; returns false if that exact value is already held.
    pub fn add_image(&mut self, image: ImageRef) -> bool {
        if self.images.contains(&image) {
            return false;
        }
        self.images.push(image);
        true
    }

    /// Removes by value, so it stays correct after earlier removals shift
    /// positions. Absent values are ignored.
    pub fn remove_image(&mut self, image: &ImageRef) -> bool {
        let before = self.images.len();
        self.images.retain(|held| held != image);
        self.images.len() != before
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/images_tests.rs"]
mod tests;
