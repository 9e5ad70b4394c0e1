//! Listing draft and the payload it is submitted as

use serde::{Deserialize, Serialize};

use super::{BackendEventType, Location, LocationPayload, Package, PhotoRef};

/// Number of fixed cover photo slots
pub const COVER_PHOTO_SLOTS: usize = 10;
/// Upper bound on uploaded cover photos
pub const MAX_COVER_PHOTOS: usize = 10;
/// Upper bound on selected event types
pub const MAX_EVENT_TYPES: usize = 6;
/// Upper bound on selected services
pub const MAX_SERVICES: usize = 6;

/// In-progress listing, as edited by the vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[serde(default)]
    pub name: String,
    /// Fixed slots; an empty entry is an unfilled slot
    #[serde(default = "empty_cover_slots")]
    pub cover_photos: Vec<PhotoRef>,
    #[serde(default)]
    pub photo_gallery: Vec<PhotoRef>,
    #[serde(default)]
    pub event_type: Vec<String>,
    #[serde(default)]
    pub services_provided: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn empty_cover_slots() -> Vec<PhotoRef> {
    vec![PhotoRef::empty(); COVER_PHOTO_SLOTS]
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            cover_photos: empty_cover_slots(),
            photo_gallery: Vec::new(),
            event_type: Vec::new(),
            services_provided: Vec::new(),
            description: String::new(),
            packages: Vec::new(),
            location: Location::default(),
            tags: Vec::new(),
        }
    }
}

impl ListingDraft {
    /// Number of cover slots holding a photo
    pub fn filled_cover_count(&self) -> usize {
        self.cover_photos.iter().filter(|p| p.is_filled()).count()
    }

    /// Whether nothing has been entered yet
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }
}

/// JSON fields of the create/update multipart request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub name: String,
    pub event_type: BackendEventType,
    pub description: String,
    pub services_provided: Vec<String>,
    pub packages: Vec<Package>,
    pub location: LocationPayload,
    pub tags: Vec<String>,
    /// Already-uploaded image URLs to keep
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub existing_images: Vec<String>,
}
