//! Watch Fixtures

use serde::Deserialize;

use crate::watches::{Gender, ImageBytes, Watch, WatchId, WatchImages};

/// Wrapper for watches in YAML
#[derive(Debug, Deserialize)]
pub struct WatchesFixture {
    /// Watches in catalog order
    pub watches: Vec<WatchFixture>,
}

/// Watch Fixture
#[derive(Debug, Deserialize)]
pub struct WatchFixture {
    /// Backend identifier
    pub id: u64,

    /// Watch name
    pub name: String,

    /// Brand
    pub company: String,

    /// Model number
    pub model_number: String,

    /// Price in whole dollars
    pub price: u64,

    /// Gender label (e.g., "Men")
    pub gender: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Featured flag
    #[serde(default)]
    pub featured: bool,

    /// Number of placeholder images to generate
    #[serde(default = "default_image_count")]
    pub images: u8,
}

fn default_image_count() -> u8 {
    1
}

/// Placeholder JPEG-signed buffer, unique per watch and position
pub fn placeholder_image(id: u64, position: u8) -> ImageBytes {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, position];
    bytes.extend_from_slice(&id.to_be_bytes());
    bytes
}

impl From<WatchFixture> for Watch {
    fn from(fixture: WatchFixture) -> Self {
        let images: WatchImages = (0..fixture.images)
            .map(|position| placeholder_image(fixture.id, position))
            .collect();

        Watch {
            id: WatchId::new(fixture.id),
            name: fixture.name,
            description: fixture.description,
            company: fixture.company,
            model_number: fixture.model_number,
            gender: Gender::from(fixture.gender),
            price: fixture.price,
            is_featured: fixture.featured,
            images,
        }
    }
}
