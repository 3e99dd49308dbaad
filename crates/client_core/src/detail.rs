//! Detail screen loading: one record, fetched with a deadline and a retry
//! affordance instead of an open-ended spinner.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{GeoPosition, OrphanageId},
    protocol::OrphanageDetail,
};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::{error::LoadError, OrphanageApi};

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(OrphanageDetail),
    Failed(LoadError),
}

struct DetailInner {
    id: Option<OrphanageId>,
    generation: u64,
    state: DetailState,
}

pub struct DetailLoader {
    api: Arc<dyn OrphanageApi>,
    timeout: Duration,
    inner: Mutex<DetailInner>,
}

impl DetailLoader {
    pub fn new(api: Arc<dyn OrphanageApi>, timeout: Duration) -> Self {
        Self {
            api,
            timeout,
            inner: Mutex::new(DetailInner {
                id: None,
                generation: 0,
                state: DetailState::Loading,
            }),
        }
    }

    pub async fn state(&self) -> DetailState {
        self.inner.lock().await.state.clone()
    }

    /// Fetches `id` and returns the resulting state. When a newer load was
    /// started meanwhile, its state wins and this result is dropped.
    pub async fn load(&self, id: OrphanageId) -> DetailState {
        let generation = {
            let mut guard = self.inner.lock().await;
            guard.id = Some(id);
            guard.generation += 1;
            guard.state = DetailState::Loading;
            guard.generation
        };

        let outcome = match tokio::time::timeout(self.timeout, self.api.get_orphanage(id)).await {
            Ok(Ok(detail)) => {
                info!(%id, "orphanage detail loaded");
                DetailState::Loaded(detail)
            }
            Ok(Err(err)) => {
                warn!(%id, error = %err, "failed to load orphanage detail");
                DetailState::Failed(err)
            }
            Err(_) => {
                warn!(%id, timeout_secs = self.timeout.as_secs(), "orphanage detail timed out");
                DetailState::Failed(LoadError::Timeout(self.timeout))
            }
        };

        let mut guard = self.inner.lock().await;
        if guard.generation == generation {
            guard.state = outcome;
        }
        guard.state.clone()
    }

    /// Re-runs the last load. `None` if nothing was ever requested.
    pub async fn retry(&self) -> Option<DetailState> {
        let id = self.inner.lock().await.id?;
        Some(self.load(id).await)
    }
}

/// Google Maps directions link to `position`.
pub fn directions_url(position: GeoPosition) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        DIRECTIONS_BASE_URL,
        &[
            ("api", "1".to_string()),
            ("destination", position.to_string()),
        ],
    )
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
