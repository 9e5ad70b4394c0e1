//! Listing photo references

use serde::{Deserialize, Serialize};

use crate::util::is_blank;

/// Binary file ready for multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    /// Persisted as base64 so drafts holding files survive a reload
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One photo of a listing
///
/// `Inline` holds a data URL (freshly picked image) or a remote URL (image
/// already stored by the backend). An empty `Inline` is an unfilled slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoRef {
    Inline(String),
    File(UploadFile),
}

impl Default for PhotoRef {
    fn default() -> Self {
        PhotoRef::Inline(String::new())
    }
}

impl PhotoRef {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn inline(value: impl Into<String>) -> Self {
        PhotoRef::Inline(value.into())
    }

    pub fn is_filled(&self) -> bool {
        match self {
            PhotoRef::Inline(s) => !is_blank(s),
            PhotoRef::File(f) => !f.is_empty(),
        }
    }

    /// `data:` URL waiting to be turned into a file
    pub fn is_data_url(&self) -> bool {
        matches!(self, PhotoRef::Inline(s) if s.trim_start().starts_with("data:"))
    }
}

impl From<&str> for PhotoRef {
    fn from(value: &str) -> Self {
        PhotoRef::Inline(value.to_string())
    }
}

impl From<String> for PhotoRef {
    fn from(value: String) -> Self {
        PhotoRef::Inline(value)
    }
}

impl From<UploadFile> for PhotoRef {
    fn from(value: UploadFile) -> Self {
        PhotoRef::File(value)
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_states() {
        assert!(!PhotoRef::empty().is_filled());
        assert!(!PhotoRef::inline("  ").is_filled());
        assert!(PhotoRef::inline("https://cdn/x.jpg").is_filled());
        assert!(PhotoRef::inline("data:image/png;base64,AAAA").is_data_url());
        assert!(!PhotoRef::inline("https://cdn/x.jpg").is_data_url());
        assert!(!PhotoRef::File(UploadFile::new("a.jpg", "image/jpeg", vec![])).is_filled());
    }

    #[test]
    fn test_file_survives_persistence() {
        let photo = PhotoRef::File(UploadFile::new("a.png", "image/png", vec![1, 2, 3]));
        let text = serde_json::to_string(&photo).unwrap();
        assert!(text.contains("AQID"));
        let back: PhotoRef = serde_json::from_str(&text).unwrap();
        assert_eq!(back, photo);

        let inline: PhotoRef = serde_json::from_str("\"\"").unwrap();
        assert_eq!(inline, PhotoRef::empty());
    }
}
