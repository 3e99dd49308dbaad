use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::GeoPosition;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    error::SubmitError,
    form::{OrphanageRecord, RegistrationFormModel},
    images::{AddImageOutcome, ImageRef, ImageSelectionManager, MediaPicker},
    navigation::{Navigator, Route, WizardSession},
    submission::SubmissionBuilder,
    Notification, OrphanageApi,
};

struct WizardState {
    form: RegistrationFormModel,
    images: ImageSelectionManager,
    mounted: bool,
}

/// Clears the in-flight flag however the submission ends, including when
/// the caller drops the future mid-request.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Controller of the data screen. Lives as long as the screen is mounted and
/// owns everything typed or picked there.
pub struct RegistrationWizard {
    position: GeoPosition,
    builder: SubmissionBuilder,
    navigator: Arc<dyn Navigator>,
    events: broadcast::Sender<Notification>,
    submitting: AtomicBool,
    inner: Mutex<WizardState>,
}

impl RegistrationWizard {
    pub fn mount(
        session: WizardSession,
        api: Arc<dyn OrphanageApi>,
        picker: Arc<dyn MediaPicker>,
        navigator: Arc<dyn Navigator>,
        events: broadcast::Sender<Notification>,
    ) -> Arc<Self> {
        let position = session.into_position();
        debug!(%position, "registration screen mounted");
        Arc::new(Self {
            position,
            builder: SubmissionBuilder::new(api),
            navigator,
            inner: Mutex::new(WizardState {
                form: RegistrationFormModel::new(),
                images: ImageSelectionManager::new(picker, events.clone()),
                mounted: true,
            }),
            submitting: AtomicBool::new(false),
            events,
        })
    }

    pub fn position(&self) -> GeoPosition {
        self.position
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Ignored once the screen is gone.
    pub async fn edit_form(&self, edit: impl FnOnce(&mut RegistrationFormModel)) {
        let mut state = self.inner.lock().await;
        if state.mounted {
            edit(&mut state.form);
        }
    }

    pub async fn record(&self) -> OrphanageRecord {
        self.inner.lock().await.form.snapshot()
    }

    pub async fn about_chars_remaining(&self) -> i64 {
        self.inner.lock().await.form.about_chars_remaining()
    }

    /// Runs the permission and picker flow without holding the screen state,
    /// then appends the result.
    pub async fn add_image(&self) -> AddImageOutcome {
        let session = {
            let state = self.inner.lock().await;
            if !state.mounted {
                return AddImageOutcome::Cancelled;
            }
            state.images.picker_session()
        };
        let flow = session.run().await;
        let mut state = self.inner.lock().await;
        if !state.mounted {
            return AddImageOutcome::Cancelled;
        }
        state.images.apply(flow)
    }

    pub async fn remove_image(&self, image: &ImageRef) -> bool {
        self.inner.lock().await.images.remove_image(image)
    }

    pub async fn images(&self) -> Vec<ImageRef> {
        self.inner.lock().await.images.images().to_vec()
    }

    /// True while a submission is outstanding; the submit control stays
    /// disabled until it resolves.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Sends a snapshot of the current form and images. Edits made while the
    /// request is in flight do not change what was sent.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        let (record, images, in_flight) = {
            let state = self.inner.lock().await;
            if !state.mounted {
                return Err(SubmitError::Unmounted);
            }
            if self
                .submitting
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(SubmitError::AlreadySubmitting);
            }
            (
                state.form.snapshot(),
                state.images.images().to_vec(),
                InFlight(&self.submitting),
            )
        };

        let result = self.builder.submit(self.position, &record, &images).await;
        drop(in_flight);

        if !self.inner.lock().await.mounted {
            debug!("registration screen gone, dropping submission result");
            return result;
        }

        match &result {
            Ok(()) => {
                let _ = self.events.send(Notification::OrphanageCreated);
                self.navigator.navigate(Route::OrphanagesMap);
            }
            Err(err) => {
                let _ = self
                    .events
                    .send(Notification::SubmissionFailed(err.to_string()));
            }
        }
        result
    }

    /// Header cancel: leave the wizard for the map and drop its state.
    pub async fn cancel(&self) {
        info!("registration cancelled");
        self.unmount().await;
        self.navigator.navigate(Route::OrphanagesMap);
    }

    pub async fn go_back(&self) {
        self.unmount().await;
        self.navigator.go_back();
    }

    pub async fn unmount(&self) {
        let mut state = self.inner.lock().await;
        state.mounted = false;
        state.form = RegistrationFormModel::new();
        state.images.clear();
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
