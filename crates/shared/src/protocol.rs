use serde::{Deserialize, Serialize};

use crate::domain::{GeoPosition, ImageId, OrphanageId};

/// Multipart field names accepted by `POST /orphanages`.
pub mod fields {
    pub const NAME: &str = "name";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const ABOUT: &str = "about";
    pub const INSTRUCTIONS: &str = "instructions";
    pub const OPENING_HOURS: &str = "opening_hours";
    pub const OPEN_ON_WEEKENDS: &str = "open_on_weekends";
    pub const IMAGES: &str = "images";
}

pub fn orphanages_route() -> &'static str {
    "/orphanages"
}

pub fn orphanage_route(id: OrphanageId) -> String {
    format!("/orphanages/{}", id.0)
}

/// Entry of `GET /orphanages`, enough to place a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanageSummary {
    pub id: OrphanageId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl OrphanageSummary {
    pub fn position(&self) -> Option<GeoPosition> {
        GeoPosition::new(self.latitude, self.longitude).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanageImage {
    pub id: ImageId,
    pub url: String,
}

/// Body of `GET /orphanages/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanageDetail {
    pub id: OrphanageId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
    #[serde(default)]
    pub images: Vec<OrphanageImage>,
}

impl OrphanageDetail {
    pub fn summary(&self) -> OrphanageSummary {
        OrphanageSummary {
            id: self.id,
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_without_images_defaults_to_empty_list() {
        let detail: OrphanageDetail = serde_json::from_str(
            r#"{"id":3,"name":"Lar","latitude":-21.6,"longitude":-48.3,"about":"a",
                "instructions":"i","opening_hours":"8-18","open_on_weekends":false}"#,
        )
        .expect("detail");
        assert!(detail.images.is_empty());
        assert_eq!(detail.summary().id, OrphanageId(3));
    }

    #[test]
    fn orphanage_route_embeds_id() {
        assert_eq!(orphanage_route(OrphanageId(9)), "/orphanages/9");
    }
}
