//! Draft → multipart upload

use shared::models::{BackendEventType, ListingDraft, ListingPayload, MAX_COVER_PHOTOS, PhotoRef, UploadFile};
use shared::util::is_blank;

use super::DraftError;
use super::image::{data_url_to_file, extension_for};
use crate::api::IMAGES_FIELD;
use crate::error::ClientResult;
use crate::http::UploadForm;

/// Validated draft, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct ListingUpload {
    pub payload: ListingPayload,
    pub files: Vec<UploadFile>,
}

impl ListingUpload {
    /// Multipart body: scalar fields as text, structured ones JSON-encoded,
    /// every file under `images`
    pub fn into_form(self) -> ClientResult<UploadForm> {
        let payload = self.payload;
        let mut form = UploadForm::new()
            .text("name", payload.name)
            .text("eventType", payload.event_type.as_str())
            .text("description", payload.description)
            .json("servicesProvided", &payload.services_provided)?
            .json("packages", &payload.packages)?
            .json("location", &payload.location)?
            .json("tags", &payload.tags)?;
        if !payload.existing_images.is_empty() {
            form = form.json("existingImages", &payload.existing_images)?;
        }
        for file in self.files {
            form = form.file(IMAGES_FIELD, file);
        }
        Ok(form)
    }
}

/// Validate `draft` and convert it for upload
///
/// Checks run in a fixed order and the first failure wins: required
/// fields, then at least one cover photo, then the cover photo cap.
pub fn build_upload(draft: &ListingDraft) -> Result<ListingUpload, DraftError> {
    let required: [(&'static str, bool); 5] = [
        ("name", is_blank(&draft.name)),
        ("event type", draft.event_type.is_empty()),
        ("description", is_blank(&draft.description)),
        ("services provided", draft.services_provided.is_empty()),
        ("location", draft.location.is_empty()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, missing)| *missing) {
        return Err(DraftError::MissingRequired { field: *field });
    }

    let cover_count = draft.filled_cover_count();
    if cover_count == 0 {
        return Err(DraftError::ImageRequired);
    }
    if cover_count > MAX_COVER_PHOTOS {
        return Err(DraftError::too_many(cover_count));
    }

    let event_type = map_event_type(&draft.event_type[0]);

    let mut files = Vec::new();
    let mut existing_images = Vec::new();
    let photos = draft
        .cover_photos
        .iter()
        .chain(draft.photo_gallery.iter())
        .filter(|p| p.is_filled());
    for (i, photo) in photos.enumerate() {
        match photo {
            PhotoRef::Inline(url) if photo.is_data_url() => {
                let url = url.trim();
                let mime = url
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split([';', ',']).next())
                    .unwrap_or_default();
                let name = format!("image-{i}.{}", extension_for(mime));
                files.push(data_url_to_file(url, &name)?);
            }
            PhotoRef::Inline(url) => existing_images.push(url.trim().to_string()),
            PhotoRef::File(file) => files.push(file.clone()),
        }
    }

    Ok(ListingUpload {
        payload: ListingPayload {
            name: draft.name.trim().to_string(),
            event_type,
            description: draft.description.trim().to_string(),
            services_provided: draft.services_provided.clone(),
            packages: draft.packages.clone(),
            location: draft.location.to_payload(),
            tags: draft.tags.clone(),
            existing_images,
        },
        files,
    })
}

fn map_event_type(label: &str) -> BackendEventType {
    BackendEventType::from_label(label).unwrap_or_else(|| {
        tracing::warn!(label = %label, "Unmapped event type, sending \"other\"");
        BackendEventType::Other
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Location, Package, PackagePrice};

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn complete() -> ListingDraft {
        let mut draft = ListingDraft {
            name: "Golden Hour Photo".into(),
            event_type: vec!["Wedding".into()],
            description: "Photography".into(),
            services_provided: vec!["Photography".into()],
            location: Location::freeform("NYC"),
            ..Default::default()
        };
        draft.cover_photos[0] = PhotoRef::inline(PNG);
        draft
    }

    #[test]
    fn test_missing_fields_in_order() {
        let mut draft = complete();
        draft.name = "  ".into();
        draft.description = String::new();
        assert_eq!(
            build_upload(&draft).unwrap_err(),
            DraftError::MissingRequired { field: "name" }
        );

        let mut draft = complete();
        draft.services_provided.clear();
        draft.location = Location::freeform("");
        assert_eq!(
            build_upload(&draft).unwrap_err(),
            DraftError::MissingRequired { field: "services provided" }
        );

        let mut draft = complete();
        draft.location = Location::structured("", "", "");
        assert_eq!(
            build_upload(&draft).unwrap_err(),
            DraftError::MissingRequired { field: "location" }
        );
    }

    #[test]
    fn test_name_missing_even_without_other_problems() {
        let mut draft = complete();
        draft.name.clear();
        let err = build_upload(&draft).unwrap_err();
        assert!(err.to_string().contains("required fields"));
    }

    #[test]
    fn test_cover_photo_bounds() {
        let mut draft = complete();
        draft.cover_photos[0] = PhotoRef::empty();
        // Gallery alone is not enough
        draft.photo_gallery.push(PhotoRef::inline(PNG));
        assert_eq!(build_upload(&draft).unwrap_err(), DraftError::ImageRequired);

        let mut draft = complete();
        draft.cover_photos = vec![PhotoRef::inline(PNG); 11];
        let err = build_upload(&draft).unwrap_err();
        assert_eq!(err, DraftError::TooManyImages { count: 11, max: 10 });
        assert!(err.to_string().contains("maximum of 10 images"));
    }

    #[test]
    fn test_event_type_mapping() {
        let mut draft = complete();
        draft.event_type = vec!["Workshop".into(), "Wedding".into()];
        assert_eq!(build_upload(&draft).unwrap().payload.event_type, BackendEventType::Corporate);

        draft.event_type = vec!["Baby Shower".into()];
        assert_eq!(build_upload(&draft).unwrap().payload.event_type, BackendEventType::Other);
    }

    #[test]
    fn test_images_split_into_files_and_existing() {
        let mut draft = complete();
        draft.cover_photos[3] = PhotoRef::inline("https://cdn.example.com/a.jpg");
        draft.photo_gallery = vec![
            PhotoRef::File(UploadFile::new("menu.pdf", "application/pdf", vec![1, 2])),
            PhotoRef::empty(),
        ];

        let upload = build_upload(&draft).unwrap();
        assert_eq!(upload.payload.existing_images, vec!["https://cdn.example.com/a.jpg"]);
        let names: Vec<_> = upload.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["image-0.png", "menu.pdf"]);
        assert_eq!(upload.files[0].mime_type, "image/png");
    }

    #[test]
    fn test_structured_location_payload() {
        let mut draft = complete();
        draft.location = Location::structured("Austin", "TX", "78701");
        let payload = build_upload(&draft).unwrap().payload;
        assert_eq!(payload.location.city.as_deref(), Some("Austin"));
        assert_eq!(payload.location.zip_code.as_deref(), Some("78701"));
        assert_eq!(payload.location.country.as_deref(), Some("United States"));
        assert!(payload.location.address.is_none());
    }

    #[test]
    fn test_into_form() {
        let mut draft = complete();
        draft.packages.push(Package {
            name: "Basic".into(),
            price: PackagePrice::Amount(500.0),
            description: String::new(),
            includes: vec![],
        });
        let form = build_upload(&draft).unwrap().into_form().unwrap();
        assert_eq!(form.field("name"), Some("Golden Hour Photo"));
        assert_eq!(form.field("eventType"), Some("wedding"));
        assert_eq!(form.field("location"), Some(r#"{"address":"NYC"}"#));
        assert!(form.field("existingImages").is_none());
        assert!(form.field("packages").unwrap().contains("Basic"));
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].0, IMAGES_FIELD);
    }
}
