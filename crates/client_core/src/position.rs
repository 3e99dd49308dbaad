use std::sync::Arc;

use shared::domain::GeoPosition;
use tracing::debug;

use crate::navigation::{Navigator, Route, WizardSession};

/// First wizard screen: a map press places the marker, confirming hands the
/// marker position to the data screen.
pub struct PositionPicker {
    navigator: Arc<dyn Navigator>,
    marker: Option<GeoPosition>,
}

impl PositionPicker {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            marker: None,
        }
    }

    pub fn handle_map_press(&mut self, position: GeoPosition) {
        debug!(%position, "map position selected");
        self.marker = Some(position);
    }

    /// Sends the marked position forward. Without a marker there is nothing
    /// to confirm and no navigation happens.
    pub fn choose_position(&self) -> Option<GeoPosition> {
        let position = self.marker?;
        self.navigator
            .navigate(Route::OrphanageData(WizardSession::new(position)));
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<Route>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.lock().expect("routes").push(route);
        }

        fn go_back(&self) {}
    }

    #[test]
    fn confirm_without_marker_does_not_navigate() {
        let navigator = Arc::new(RecordingNavigator::default());
        let picker = PositionPicker::new(navigator.clone());

        assert_eq!(picker.choose_position(), None);
        assert!(navigator.routes.lock().expect("routes").is_empty());
    }

    #[test]
    fn latest_press_is_handed_to_data_screen() {
        let navigator = Arc::new(RecordingNavigator::default());
        let mut picker = PositionPicker::new(navigator.clone());
        let first = GeoPosition::new(-21.0, -48.0).expect("pos");
        let second = GeoPosition::new(-21.61, -48.35).expect("pos");

        picker.handle_map_press(first);
        picker.handle_map_press(second);
        assert_eq!(picker.choose_position(), Some(second));

        let mut routes = navigator.routes.lock().expect("routes");
        assert_eq!(routes.len(), 1);
        match routes.pop() {
            Some(Route::OrphanageData(session)) => assert_eq!(session.into_position(), second),
            other => panic!("unexpected route: {other:?}"),
        }
    }
}
