//! Terminal stand-ins for the device picker and the screen navigator.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use client_core::{ImageRef, MediaPicker, Navigator, PickerResult, Route, WizardSession};
use tracing::info;

/// Hands out the `--image` paths in order, then behaves like a dismissed
/// picker.
pub struct FileQueuePicker {
    queue: Mutex<VecDeque<PathBuf>>,
}

impl FileQueuePicker {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            queue: Mutex::new(paths.into()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }
}

#[async_trait]
impl MediaPicker for FileQueuePicker {
    async fn request_permission(&self) -> Result<bool> {
        Ok(true)
    }

    async fn pick_image(&self) -> Result<PickerResult> {
        let next = self
            .queue
            .lock()
            .map_err(|_| anyhow!("image queue poisoned"))?
            .pop_front();
        let Some(path) = next else {
            return Ok(PickerResult::Cancelled);
        };
        let path = path
            .canonicalize()
            .with_context(|| format!("image '{}' is not readable", path.display()))?;
        let image = ImageRef::from_path(&path)
            .ok_or_else(|| anyhow!("image '{}' has no file URI", path.display()))?;
        Ok(PickerResult::Selected(image))
    }
}

/// Logs every transition and keeps the last one so the caller can pick up
/// the wizard hand-off.
#[derive(Default)]
pub struct TerminalNavigator {
    last: Mutex<Option<Route>>,
}

impl TerminalNavigator {
    pub fn take_wizard_session(&self) -> Option<WizardSession> {
        match self.last.lock().ok()?.take() {
            Some(Route::OrphanageData(session)) => Some(session),
            _ => None,
        }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        info!(route = route.name(), "navigate");
        if let Ok(mut last) = self.last.lock() {
            *last = Some(route);
        }
    }

    fn go_back(&self) {
        info!("navigate back");
        if let Ok(mut last) = self.last.lock() {
            *last = None;
        }
    }
}
