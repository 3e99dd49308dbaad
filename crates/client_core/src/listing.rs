use std::sync::Arc;

use shared::protocol::OrphanageSummary;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::{error::LoadError, Notification, OrphanageApi};

struct ListingState {
    generation: u64,
    orphanages: Vec<OrphanageSummary>,
}

/// Backing state of the map screen. Reloaded whenever the screen regains
/// focus, including after a successful registration.
pub struct ListingLoader {
    api: Arc<dyn OrphanageApi>,
    events: broadcast::Sender<Notification>,
    state: RwLock<ListingState>,
}

impl ListingLoader {
    pub fn new(api: Arc<dyn OrphanageApi>, events: broadcast::Sender<Notification>) -> Self {
        Self {
            api,
            events,
            state: RwLock::new(ListingState {
                generation: 0,
                orphanages: Vec::new(),
            }),
        }
    }

    /// On failure the previous list stays visible and a notification is
    /// published. When a newer reload started meanwhile, this response is
    /// dropped and the newer one decides the list.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.generation
        };

        let result = self.api.list_orphanages().await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(generation, "dropping superseded orphanage listing");
            return result.map(|orphanages| orphanages.len());
        }
        match result {
            Ok(orphanages) => {
                let count = orphanages.len();
                state.orphanages = orphanages;
                info!(count, "orphanage listing loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "failed to load orphanage listing");
                let _ = self
                    .events
                    .send(Notification::ListingLoadFailed(err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn orphanages(&self) -> Vec<OrphanageSummary> {
        self.state.read().await.orphanages.clone()
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.orphanages.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use shared::{domain::OrphanageId, protocol::OrphanageDetail};
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        error::SubmitError,
        submission::SubmissionPayload,
        test_support::{drain, FakeApi},
    };

    /// The first listing request hangs until released and answers with an
    /// outdated list; later requests answer at once.
    #[derive(Default)]
    struct SlowFirstListApi {
        calls: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl OrphanageApi for SlowFirstListApi {
        async fn list_orphanages(&self) -> Result<Vec<OrphanageSummary>, LoadError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.release.notified().await;
                return Ok(vec![summary(1, "Lar A")]);
            }
            Ok(vec![summary(1, "Lar A"), summary(2, "Lar B")])
        }

        async fn get_orphanage(&self, _id: OrphanageId) -> Result<OrphanageDetail, LoadError> {
            Err(LoadError::Network("unused".to_string()))
        }

        async fn create_orphanage(&self, _payload: SubmissionPayload) -> Result<(), SubmitError> {
            Ok(())
        }
    }

    fn summary(id: i64, name: &str) -> OrphanageSummary {
        OrphanageSummary {
            id: OrphanageId(id),
            name: name.to_string(),
            latitude: -21.6,
            longitude: -48.3,
        }
    }

    #[tokio::test]
    async fn reload_replaces_cached_list() {
        let api = Arc::new(FakeApi::default());
        api.listing
            .lock()
            .expect("listing")
            .extend([summary(1, "Lar A"), summary(2, "Lar B")]);
        let (events, _rx) = broadcast::channel(8);
        let loader = ListingLoader::new(api, events);

        assert_eq!(loader.count().await, 0);
        assert_eq!(loader.reload().await.expect("reload"), 2);
        assert_eq!(loader.orphanages().await[1].name, "Lar B");
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_list_and_notifies() {
        let api = Arc::new(FakeApi::default());
        api.listing.lock().expect("listing").push(summary(1, "Lar A"));
        let (events, mut rx) = broadcast::channel(8);
        let loader = ListingLoader::new(api.clone(), events);
        loader.reload().await.expect("first load");

        api.fail_next_list("Network Error");
        let err = loader.reload().await.expect_err("second load");

        assert_eq!(err, LoadError::Network("Network Error".to_string()));
        assert_eq!(loader.count().await, 1);
        assert_eq!(
            drain(&mut rx),
            vec![Notification::ListingLoadFailed("Network Error".to_string())]
        );
    }

    #[tokio::test]
    async fn slow_older_reload_does_not_overwrite_newer_list() {
        let api = Arc::new(SlowFirstListApi::default());
        let (events, _rx) = broadcast::channel(8);
        let loader = Arc::new(ListingLoader::new(api.clone(), events));

        let slow_loader = loader.clone();
        let slow = tokio::spawn(async move { slow_loader.reload().await });
        while api.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.reload().await.expect("newer reload"), 2);
        api.release.notify_one();
        assert_eq!(slow.await.expect("join").expect("older reload"), 1);

        assert_eq!(loader.count().await, 2);
        assert_eq!(loader.orphanages().await[1].name, "Lar B");
    }
}
