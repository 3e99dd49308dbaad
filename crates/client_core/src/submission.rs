use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use shared::{domain::GeoPosition, protocol::fields};
use tracing::{debug, info, warn};

use crate::{error::SubmitError, form::OrphanageRecord, images::ImageRef, OrphanageApi};

/// Every image part carries this type, whatever the file really holds.
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: &'static str,
    pub source: ImageRef,
}

/// Flattened creation request. Files are referenced, not loaded, until the
/// payload is turned into a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    text_fields: Vec<TextField>,
    files: Vec<FilePart>,
}

impl SubmissionPayload {
    pub fn build(position: GeoPosition, record: &OrphanageRecord, images: &[ImageRef]) -> Self {
        let text_fields = vec![
            text(fields::NAME, record.name.clone()),
            text(fields::LATITUDE, position.latitude().to_string()),
            text(fields::LONGITUDE, position.longitude().to_string()),
            text(fields::ABOUT, record.about.clone()),
            text(fields::INSTRUCTIONS, record.instructions.clone()),
            text(fields::OPENING_HOURS, record.opening_hours.clone()),
            text(fields::OPEN_ON_WEEKENDS, record.open_on_weekends.to_string()),
        ];

        let files = images
            .iter()
            .enumerate()
            .map(|(index, image)| FilePart {
                field: fields::IMAGES,
                file_name: format!("image_{index}.jpg"),
                content_type: IMAGE_CONTENT_TYPE,
                source: image.clone(),
            })
            .collect();

        Self { text_fields, files }
    }

    pub fn text_fields(&self) -> &[TextField] {
        &self.text_fields
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Reads every referenced image and encodes the multipart body.
    pub async fn into_form(self) -> Result<Form, SubmitError> {
        let mut form = Form::new();
        for field in self.text_fields {
            form = form.text(field.name, field.value);
        }

        for file in self.files {
            let bytes = tokio::fs::read(file.source.local_path())
                .await
                .map_err(|source| SubmitError::ImageUnreadable {
                    uri: file.source.to_string(),
                    source,
                })?;
            debug!(file_name = %file.file_name, size_bytes = bytes.len(), "attaching image");
            let part = Part::bytes(bytes)
                .file_name(file.file_name)
                .mime_str(file.content_type)
                .map_err(|err| SubmitError::Encoding(err.to_string()))?;
            form = form.part(file.field, part);
        }

        Ok(form)
    }
}

fn text(name: &'static str, value: String) -> TextField {
    TextField { name, value }
}

/// Checks the accumulated wizard state and sends it as one creation request.
#[derive(Clone)]
pub struct SubmissionBuilder {
    api: Arc<dyn OrphanageApi>,
}

impl SubmissionBuilder {
    pub fn new(api: Arc<dyn OrphanageApi>) -> Self {
        Self { api }
    }

    pub async fn submit(
        &self,
        position: GeoPosition,
        record: &OrphanageRecord,
        images: &[ImageRef],
    ) -> Result<(), SubmitError> {
        let missing = record.missing_required();
        if !missing.is_empty() {
            return Err(SubmitError::Incomplete {
                missing: missing.into_iter().map(|field| field.label()).collect(),
            });
        }
        if images.is_empty() {
            return Err(SubmitError::NoImages);
        }

        let payload = SubmissionPayload::build(position, record, images);
        info!(
            name = %record.name,
            %position,
            image_count = images.len(),
            "submitting orphanage"
        );
        match self.api.create_orphanage(payload).await {
            Ok(()) => {
                info!(name = %record.name, "orphanage created");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "orphanage submission failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
