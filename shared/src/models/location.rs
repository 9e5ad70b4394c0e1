//! Listing location
//!
//! Listing forms produce either a single free-text address or a
//! city/state/zip breakdown, and older payloads spell the zip field
//! `zip`. Both are accepted here and resolved into one variant. A
//! freeform location submitted as `{ address }` reads back as freeform.

use serde::{Deserialize, Deserializer, Serialize};

use crate::util::is_blank;

/// Country assumed when a structured location does not name one
pub const DEFAULT_COUNTRY: &str = "United States";

/// City/state/zip breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "zip")]
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl StructuredLocation {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.city) && is_blank(&self.state) && is_blank(&self.zip_code)
    }
}

/// Location of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Location {
    Freeform(String),
    Structured(StructuredLocation),
}

/// Every shape a stored location comes back in
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLocation {
    Text(String),
    Object {
        #[serde(default)]
        address: Option<String>,
        #[serde(flatten)]
        structured: StructuredLocation,
    },
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StoredLocation::deserialize(deserializer)? {
            StoredLocation::Text(address) => Location::Freeform(address),
            // `{ address }` is how a freeform location is submitted
            StoredLocation::Object {
                address: Some(address),
                structured,
            } if !is_blank(&address) && structured.is_empty() => {
                Location::Freeform(address)
            }
            StoredLocation::Object { structured, .. } => Location::Structured(structured),
        })
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::Freeform(String::new())
    }
}

impl Location {
    pub fn freeform(address: impl Into<String>) -> Self {
        Location::Freeform(address.into())
    }

    pub fn structured(
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Location::Structured(StructuredLocation {
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: None,
        })
    }

    /// No usable location has been entered
    pub fn is_empty(&self) -> bool {
        match self {
            Location::Freeform(s) => is_blank(s),
            Location::Structured(s) => s.is_empty(),
        }
    }

    /// Backend representation
    pub fn to_payload(&self) -> LocationPayload {
        match self {
            Location::Freeform(address) => LocationPayload {
                address: Some(address.trim().to_string()),
                ..Default::default()
            },
            Location::Structured(s) => LocationPayload {
                address: None,
                city: Some(s.city.clone()),
                state: Some(s.state.clone()),
                zip_code: Some(s.zip_code.clone()),
                country: Some(
                    s.country
                        .clone()
                        .filter(|c| !is_blank(c))
                        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
                ),
            },
        }
    }
}

/// Location as the create/update endpoints expect it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}
