//! Draft state holder

use parking_lot::Mutex;
use shared::models::{
    COVER_PHOTO_SLOTS, EventDetails, ListingDraft, Location, MAX_EVENT_TYPES, MAX_SERVICES,
    Package, PhotoRef,
};
use tokio::sync::watch;

use super::DraftError;
use super::upload::build_upload;
use crate::api::MarketApi;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::storage::{KEY_LISTING_DRAFT, Storage, StorageExt};

/// One draft field with its new value
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    CoverPhotos(Vec<PhotoRef>),
    PhotoGallery(Vec<PhotoRef>),
    EventType(Vec<String>),
    ServicesProvided(Vec<String>),
    Description(String),
    Packages(Vec<Package>),
    Location(Location),
    Tags(Vec<String>),
}

impl DraftField {
    pub fn name(&self) -> &'static str {
        match self {
            DraftField::Name(_) => "name",
            DraftField::CoverPhotos(_) => "coverPhotos",
            DraftField::PhotoGallery(_) => "photoGallery",
            DraftField::EventType(_) => "eventType",
            DraftField::ServicesProvided(_) => "servicesProvided",
            DraftField::Description(_) => "description",
            DraftField::Packages(_) => "packages",
            DraftField::Location(_) => "location",
            DraftField::Tags(_) => "tags",
        }
    }

    /// Write into `draft`, returning whether anything changed
    fn apply(self, draft: &mut ListingDraft) -> bool {
        match self {
            DraftField::Name(v) => replace(&mut draft.name, v),
            DraftField::CoverPhotos(v) => replace(&mut draft.cover_photos, v),
            DraftField::PhotoGallery(v) => replace(&mut draft.photo_gallery, v),
            DraftField::EventType(v) => replace(&mut draft.event_type, v),
            DraftField::ServicesProvided(v) => replace(&mut draft.services_provided, v),
            DraftField::Description(v) => replace(&mut draft.description, v),
            DraftField::Packages(v) => replace(&mut draft.packages, v),
            DraftField::Location(v) => replace(&mut draft.location, v),
            DraftField::Tags(v) => replace(&mut draft.tags, v),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// The vendor's single in-progress listing
///
/// Every change is written through to `storage` under `listingDraft`.
pub struct DraftStore<S: Storage> {
    storage: S,
    tx: watch::Sender<ListingDraft>,
    editing: Mutex<Option<String>>,
    /// Serializes snapshot + write so storage never ends on an older draft
    persisting: Mutex<()>,
}

impl<S: Storage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        let (tx, _) = watch::channel(ListingDraft::default());
        Self {
            storage,
            tx,
            editing: Mutex::new(None),
            persisting: Mutex::new(()),
        }
    }

    pub fn draft(&self) -> ListingDraft {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingDraft> {
        self.tx.subscribe()
    }

    /// Id of the listing being edited, `None` when creating
    pub fn editing_id(&self) -> Option<String> {
        self.editing.lock().clone()
    }

    /// Replace one field and persist the whole draft
    pub fn set_field(&self, field: DraftField) {
        let name = field.name();
        let changed = self.tx.send_if_modified(|draft| field.apply(draft));
        tracing::trace!(field = name, changed, "Draft field set");
        self.persist();
    }

    /// Edit the draft in place and persist it when `edit` reports a change
    ///
    /// The read and the write happen under the channel lock, so concurrent
    /// mutators never overwrite each other.
    fn update(&self, edit: impl FnOnce(&mut ListingDraft) -> bool) -> bool {
        let changed = self.tx.send_if_modified(edit);
        if changed {
            self.persist();
        }
        changed
    }

    // ========== Convenience mutators ==========

    pub fn set_name(&self, name: impl Into<String>) {
        self.set_field(DraftField::Name(name.into()));
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.set_field(DraftField::Description(description.into()));
    }

    pub fn set_location(&self, location: Location) {
        self.set_field(DraftField::Location(location));
    }

    /// Fill or replace one cover slot; returns `false` for an out-of-range slot
    pub fn set_cover_photo(&self, slot: usize, photo: impl Into<PhotoRef>) -> bool {
        if slot >= COVER_PHOTO_SLOTS {
            tracing::warn!(slot, "Cover photo slot out of range");
            return false;
        }
        let photo = photo.into();
        self.update(|draft| {
            if draft.cover_photos.len() < COVER_PHOTO_SLOTS {
                draft.cover_photos.resize(COVER_PHOTO_SLOTS, PhotoRef::empty());
            }
            replace(&mut draft.cover_photos[slot], photo)
        });
        true
    }

    pub fn clear_cover_photo(&self, slot: usize) -> bool {
        self.set_cover_photo(slot, PhotoRef::empty())
    }

    pub fn add_gallery_photo(&self, photo: impl Into<PhotoRef>) {
        let photo = photo.into();
        self.update(|draft| {
            draft.photo_gallery.push(photo);
            true
        });
    }

    pub fn remove_gallery_photo(&self, index: usize) -> bool {
        self.update(|draft| {
            if index >= draft.photo_gallery.len() {
                return false;
            }
            draft.photo_gallery.remove(index);
            true
        })
    }

    pub fn add_package(&self, package: Package) {
        self.update(|draft| {
            draft.packages.push(package);
            true
        });
    }

    pub fn update_package(&self, index: usize, package: Package) -> bool {
        let mut found = false;
        self.update(|draft| match draft.packages.get_mut(index) {
            Some(slot) => {
                found = true;
                replace(slot, package)
            }
            None => false,
        });
        found
    }

    pub fn remove_package(&self, index: usize) -> bool {
        self.update(|draft| {
            if index >= draft.packages.len() {
                return false;
            }
            draft.packages.remove(index);
            true
        })
    }

    /// Select or deselect an event type; selecting beyond the cap is refused
    pub fn toggle_event_type(&self, label: &str) -> bool {
        self.update(|draft| toggle(&mut draft.event_type, label, MAX_EVENT_TYPES))
    }

    pub fn toggle_service(&self, service: &str) -> bool {
        self.update(|draft| toggle(&mut draft.services_provided, service, MAX_SERVICES))
    }

    /// Add a trimmed tag unless blank or already present
    pub fn add_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.update(|draft| {
            if draft.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
            draft.tags.push(tag.to_string());
            true
        })
    }

    pub fn remove_tag(&self, tag: &str) -> bool {
        self.update(|draft| {
            let before = draft.tags.len();
            draft.tags.retain(|t| t != tag);
            draft.tags.len() != before
        })
    }

    // ========== Lifecycle ==========

    /// Begin a new listing from an empty draft
    pub fn start_create(&self) {
        *self.editing.lock() = None;
        self.tx.send_replace(ListingDraft::default());
        self.remove_persisted();
        tracing::debug!("Started new listing draft");
    }

    /// Begin editing `event`
    ///
    /// The first ten images fill the cover slots, the rest go to the
    /// gallery.
    pub fn start_edit(&self, event: &EventDetails) {
        let mut cover_photos: Vec<PhotoRef> = event
            .images
            .iter()
            .take(COVER_PHOTO_SLOTS)
            .map(|url| PhotoRef::inline(url.as_str()))
            .collect();
        cover_photos.resize(COVER_PHOTO_SLOTS, PhotoRef::empty());

        let draft = ListingDraft {
            name: event.name.clone(),
            cover_photos,
            photo_gallery: event
                .images
                .iter()
                .skip(COVER_PHOTO_SLOTS)
                .map(|url| PhotoRef::inline(url.as_str()))
                .collect(),
            event_type: vec![event.event_type.label().to_string()],
            services_provided: event.services_provided.clone(),
            description: event.description.clone(),
            packages: event.packages.clone(),
            location: event.location.clone(),
            tags: event.tags.clone(),
        };

        *self.editing.lock() = Some(event.id.clone());
        self.tx.send_replace(draft);
        self.persist();
        tracing::debug!(event_id = %event.id, "Editing listing");
    }

    /// Reload the draft from storage; returns whether one was found
    pub fn restore(&self) -> bool {
        match self.storage.load_json::<ListingDraft>(KEY_LISTING_DRAFT) {
            Ok(Some(mut draft)) => {
                if draft.cover_photos.len() < COVER_PHOTO_SLOTS {
                    draft.cover_photos.resize(COVER_PHOTO_SLOTS, PhotoRef::empty());
                }
                self.tx.send_replace(draft);
                tracing::debug!("Restored listing draft");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Discarding unreadable listing draft: {}", e);
                self.remove_persisted();
                false
            }
        }
    }

    /// Reset to an empty draft and drop the persisted copy
    pub fn clear(&self) {
        *self.editing.lock() = None;
        self.tx.send_replace(ListingDraft::default());
        self.remove_persisted();
    }

    /// Validate and submit the draft
    ///
    /// Validation failures return before any request is made. The draft is
    /// left as is; callers clear it once they are done with the result.
    pub async fn save_listing<H: HttpClient>(
        &self,
        api: &MarketApi<H>,
        is_update: bool,
        event_id: Option<&str>,
    ) -> ClientResult<EventDetails> {
        let draft = self.draft();
        let upload = build_upload(&draft)?;
        let file_count = upload.files.len();
        let form = upload.into_form()?;

        if is_update {
            let id = event_id.ok_or(DraftError::MissingEventId)?;
            tracing::info!(event_id = %id, file_count, "Updating listing");
            api.update_event(id, form).await
        } else {
            tracing::info!(file_count, "Creating listing");
            api.create_event(form).await
        }
    }

    fn persist(&self) {
        let _guard = self.persisting.lock();
        let draft = self.tx.borrow().clone();
        if let Err(e) = self.storage.save_json(KEY_LISTING_DRAFT, &draft) {
            tracing::warn!("Failed to persist listing draft: {}", e);
        }
    }

    fn remove_persisted(&self) {
        let _guard = self.persisting.lock();
        if let Err(e) = self.storage.remove(KEY_LISTING_DRAFT) {
            tracing::warn!("Failed to remove persisted listing draft: {}", e);
        }
    }
}

/// Toggle `value` in `list`; `false` when adding would exceed `max`
fn toggle(list: &mut Vec<String>, value: &str, max: usize) -> bool {
    if let Some(idx) = list.iter().position(|v| v == value) {
        list.remove(idx);
        return true;
    }
    if list.len() >= max {
        tracing::debug!(value = %value, max, "Selection limit reached");
        return false;
    }
    list.push(value.to_string());
    true
}
