//! Watches

use std::{
    fmt::{self, Debug, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Maximum number of images a watch can carry.
pub const MAX_IMAGES: usize = 5;

/// Raw, encoded image bytes exactly as stored by the backend.
pub type ImageBytes = Vec<u8>;

/// Ordered image buffers for a watch. The first buffer is the main image.
pub type WatchImages = SmallVec<[ImageBytes; MAX_IMAGES]>;

/// Backend-assigned watch identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchId(u64);

impl WatchId {
    /// Wrap a raw identifier received from the backend.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for WatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for WatchId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for WatchId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Gender category a watch is marketed under.
///
/// The backend stores this as free text, so values outside the three the storefront
/// offers are kept verbatim in [`Gender::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    /// Men's watches.
    #[default]
    Men,

    /// Women's watches.
    Women,

    /// Unisex watches.
    Unisex,

    /// Any other label stored by the backend.
    Other(String),
}

impl Gender {
    /// The categories offered by the filter sidebar and the admin form, in display order.
    pub const OFFERED: [Gender; 3] = [Gender::Men, Gender::Women, Gender::Unisex];

    /// Label as stored by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
            Gender::Other(label) => label,
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Men" => Gender::Men,
            "Women" => Gender::Women,
            "Unisex" => Gender::Unisex,
            _ => Gender::Other(value),
        }
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        Gender::from(value.to_string())
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Everything about a watch except its identity.
///
/// This is the payload the backend accepts when a watch is created or replaced.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchDetails {
    /// Display name.
    pub name: String,

    /// Brand.
    pub company: String,

    /// Manufacturer model number.
    pub model_number: String,

    /// Price in whole currency units.
    pub price: u64,

    /// Gender category.
    pub gender: Gender,

    /// Long-form description.
    pub description: String,

    /// Image buffers, main image first.
    pub images: WatchImages,

    /// Whether the watch is shown in the featured section.
    pub is_featured: bool,
}

impl Debug for WatchDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchDetails")
            .field("name", &self.name)
            .field("company", &self.company)
            .field("model_number", &self.model_number)
            .field("price", &self.price)
            .field("gender", &self.gender)
            .field("image_count", &self.images.len())
            .field("is_featured", &self.is_featured)
            .finish_non_exhaustive()
    }
}

/// A catalog entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watch {
    /// Backend-assigned identifier.
    pub id: WatchId,

    /// Display name.
    pub name: String,

    /// Long-form description.
    pub description: String,

    /// Brand.
    pub company: String,

    /// Manufacturer model number.
    pub model_number: String,

    /// Gender category.
    pub gender: Gender,

    /// Price in whole currency units.
    pub price: u64,

    /// Whether the watch is shown in the featured section.
    pub is_featured: bool,

    /// Image buffers, main image first.
    pub images: WatchImages,
}

impl Watch {
    /// Assemble a watch from its identifier and details.
    #[must_use]
    pub fn from_details(id: WatchId, details: WatchDetails) -> Self {
        let WatchDetails {
            name,
            company,
            model_number,
            price,
            gender,
            description,
            images,
            is_featured,
        } = details;

        Self {
            id,
            name,
            description,
            company,
            model_number,
            gender,
            price,
            is_featured,
            images,
        }
    }

    /// A copy of everything except the identifier.
    #[must_use]
    pub fn details(&self) -> WatchDetails {
        WatchDetails {
            name: self.name.clone(),
            company: self.company.clone(),
            model_number: self.model_number.clone(),
            price: self.price,
            gender: self.gender.clone(),
            description: self.description.clone(),
            images: self.images.clone(),
            is_featured: self.is_featured,
        }
    }

    /// The listing image, if the watch has any images.
    #[must_use]
    pub fn main_image(&self) -> Option<&[u8]> {
        self.images.first().map(Vec::as_slice)
    }
}

impl Debug for Watch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("company", &self.company)
            .field("model_number", &self.model_number)
            .field("gender", &self.gender)
            .field("price", &self.price)
            .field("is_featured", &self.is_featured)
            .field("image_count", &self.images.len())
            .finish_non_exhaustive()
    }
}
