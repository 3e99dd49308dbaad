//! Screen routes and the typed hand-off between the two wizard screens.

use shared::domain::{GeoPosition, OrphanageId};

/// One-shot carrier of the chosen position from the map-position screen to
/// the data screen. Consumed by value when the data screen mounts.
#[derive(Debug, PartialEq)]
pub struct WizardSession {
    position: GeoPosition,
}

impl WizardSession {
    pub(crate) fn new(position: GeoPosition) -> Self {
        Self { position }
    }

    pub fn position(&self) -> GeoPosition {
        self.position
    }

    pub fn into_position(self) -> GeoPosition {
        self.position
    }
}

#[derive(Debug, PartialEq)]
pub enum Route {
    OrphanagesMap,
    OrphanageDetails { id: OrphanageId },
    SelectMapPosition,
    OrphanageData(WizardSession),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::OrphanagesMap => "OrphanagesMap",
            Route::OrphanageDetails { .. } => "OrphanageDetails",
            Route::SelectMapPosition => "SelectMapPosition",
            Route::OrphanageData(_) => "OrphanageData",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn go_back(&self);
}
