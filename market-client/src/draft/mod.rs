//! Listing draft
//!
//! The vendor's in-progress listing lives in [`DraftStore`] and is mirrored
//! to session storage on every change. [`build_upload`] validates a draft
//! and turns it into the multipart body the events endpoint expects.

mod image;
mod store;
mod upload;

pub use image::{data_url_to_file, extension_for, file_from_path};
pub use store::{DraftField, DraftStore};
pub use upload::{ListingUpload, build_upload};

use shared::models::MAX_COVER_PHOTOS;
use thiserror::Error;

/// Draft rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please fill in all required fields: {field} is missing")]
    MissingRequired { field: &'static str },

    #[error("Please add at least one image to your listing")]
    ImageRequired,

    #[error("You can upload a maximum of {max} images (got {count})")]
    TooManyImages { count: usize, max: usize },

    #[error("Invalid image data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Cannot update a listing without its id")]
    MissingEventId,
}

impl DraftError {
    pub(crate) fn too_many(count: usize) -> Self {
        DraftError::TooManyImages {
            count,
            max: MAX_COVER_PHOTOS,
        }
    }
}
