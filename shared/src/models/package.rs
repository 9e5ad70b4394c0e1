//! Service package offered by a listing

use serde::{Deserialize, Serialize};

/// Package price as entered: forms send text, stored listings send numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackagePrice {
    Amount(f64),
    Text(String),
}

impl PackagePrice {
    /// Numeric value, when the text parses (`"$1,200.50"` → 1200.5)
    pub fn amount(&self) -> Option<f64> {
        match self {
            PackagePrice::Amount(v) => Some(*v),
            PackagePrice::Text(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                cleaned.parse().ok()
            }
        }
    }
}

impl Default for PackagePrice {
    fn default() -> Self {
        PackagePrice::Text(String::new())
    }
}

/// Package entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: PackagePrice,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "includedItems")]
    pub includes: Vec<String>,
}
