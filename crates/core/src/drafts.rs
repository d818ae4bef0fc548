//! Drafts
//!
//! The admin watch form as a value: raw field text plus selected images, validated into
//! [`WatchDetails`] before anything is sent to the backend.

use std::fmt::{self, Debug, Formatter};

use thiserror::Error;

use crate::watches::{Gender, ImageBytes, MAX_IMAGES, Watch, WatchDetails};

/// Required text fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Watch name.
    Name,

    /// Brand.
    Company,

    /// Model number.
    ModelNumber,

    /// Price.
    Price,

    /// Description.
    Description,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::ModelNumber => "model number",
            Self::Price => "price",
            Self::Description => "description",
        })
    }
}

/// Reasons a draft cannot be submitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(DraftField),

    /// The price is not a non-negative whole number.
    #[error("price must be a whole number, got '{0}'")]
    InvalidPrice(String),

    /// No image selected.
    #[error("Please select at least one image")]
    NoImages,

    /// More images than a watch can carry.
    #[error("Maximum {MAX_IMAGES} images allowed")]
    TooManyImages,
}

/// Outcome of adding images to a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedImages {
    /// Images that fit into the remaining slots.
    pub accepted: usize,

    /// Images dropped because every slot was taken.
    pub rejected: usize,
}

impl AddedImages {
    /// Whether some images were dropped.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.rejected > 0
    }
}

/// Admin form state for creating or editing a watch.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WatchDraft {
    /// Display name.
    pub name: String,

    /// Brand.
    pub company: String,

    /// Model number.
    pub model_number: String,

    /// Price as typed.
    pub price: String,

    /// Gender category.
    pub gender: Gender,

    /// Long-form description.
    pub description: String,

    /// Whether the watch is featured.
    pub is_featured: bool,

    images: Vec<ImageBytes>,
}

impl WatchDraft {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the edit form from an existing watch, keeping its images.
    #[must_use]
    pub fn from_watch(watch: &Watch) -> Self {
        Self {
            name: watch.name.clone(),
            company: watch.company.clone(),
            model_number: watch.model_number.clone(),
            price: watch.price.to_string(),
            gender: watch.gender.clone(),
            description: watch.description.clone(),
            is_featured: watch.is_featured,
            images: watch.images.to_vec(),
        }
    }

    /// Selected images, in upload order.
    #[must_use]
    pub fn images(&self) -> &[ImageBytes] {
        &self.images
    }

    /// Free image slots.
    #[must_use]
    pub fn remaining_slots(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.images.len())
    }

    /// Append images up to the remaining slots. Extra images are dropped and counted.
    pub fn add_images<I>(&mut self, images: I) -> AddedImages
    where
        I: IntoIterator<Item = ImageBytes>,
    {
        let mut added = AddedImages {
            accepted: 0,
            rejected: 0,
        };

        for image in images {
            if self.images.len() < MAX_IMAGES {
                self.images.push(image);
                added.accepted += 1;
            } else {
                added.rejected += 1;
            }
        }

        added
    }

    /// Remove the image at `index`. Out of range positions are ignored.
    pub fn remove_image(&mut self, index: usize) -> Option<ImageBytes> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Check every field and build the backend payload.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking text fields in form order, then the price,
    /// then the images.
    pub fn validate(&self) -> Result<WatchDetails, DraftError> {
        for (field, value) in [
            (DraftField::Name, &self.name),
            (DraftField::Company, &self.company),
            (DraftField::ModelNumber, &self.model_number),
            (DraftField::Price, &self.price),
            (DraftField::Description, &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(DraftError::MissingField(field));
            }
        }

        let price = self
            .price
            .trim()
            .parse::<u64>()
            .map_err(|_err| DraftError::InvalidPrice(self.price.clone()))?;

        if self.images.is_empty() {
            return Err(DraftError::NoImages);
        }

        if self.images.len() > MAX_IMAGES {
            return Err(DraftError::TooManyImages);
        }

        Ok(WatchDetails {
            name: self.name.clone(),
            company: self.company.clone(),
            model_number: self.model_number.clone(),
            price,
            gender: self.gender.clone(),
            description: self.description.clone(),
            images: self.images.iter().cloned().collect(),
            is_featured: self.is_featured,
        })
    }
}

impl Debug for WatchDraft {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchDraft")
            .field("name", &self.name)
            .field("company", &self.company)
            .field("model_number", &self.model_number)
            .field("price", &self.price)
            .field("gender", &self.gender)
            .field("is_featured", &self.is_featured)
            .field("image_count", &self.images.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::watches::WatchId;

    use super::*;

    fn filled() -> WatchDraft {
        let mut draft = WatchDraft::new();
        draft.name = "Aria".to_string();
        draft.company = "Omega".to_string();
        draft.model_number = "OM-1".to_string();
        draft.price = " 5000 ".to_string();
        draft.gender = Gender::Women;
        draft.description = "Dress watch".to_string();
        draft.is_featured = true;

        draft.add_images([vec![1]]);

        draft
    }

    #[test]
    fn valid_draft_builds_details() -> TestResult {
        let details = filled().validate()?;

        assert_eq!(details.price, 5_000);
        assert_eq!(details.gender, Gender::Women);
        assert_eq!(details.images.len(), 1);
        assert!(details.is_featured);

        Ok(())
    }

    #[test]
    fn blank_fields_are_reported_in_form_order() {
        let mut draft = filled();
        draft.company = "  ".to_string();
        draft.description.clear();

        assert_eq!(
            draft.validate(),
            Err(DraftError::MissingField(DraftField::Company))
        );
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let mut draft = filled();
        draft.price = "12.5".to_string();
        assert_eq!(
            draft.validate(),
            Err(DraftError::InvalidPrice("12.5".to_string()))
        );

        draft.price = "-3".to_string();
        assert!(matches!(draft.validate(), Err(DraftError::InvalidPrice(_))));
    }

    #[test]
    fn at_least_one_image_is_required() {
        let mut draft = filled();
        draft.remove_image(0);

        assert_eq!(draft.validate(), Err(DraftError::NoImages));
        assert_eq!(
            DraftError::NoImages.to_string(),
            "Please select at least one image"
        );
    }

    #[test]
    fn adding_images_stops_at_five() {
        let mut draft = filled();

        let added = draft.add_images((0..6).map(|n| vec![n]));

        assert_eq!(added.accepted, 4);
        assert_eq!(added.rejected, 2);
        assert!(added.overflowed());
        assert_eq!(draft.images().len(), MAX_IMAGES);
        assert_eq!(draft.remaining_slots(), 0);
        assert_eq!(DraftError::TooManyImages.to_string(), "Maximum 5 images allowed");
    }

    #[test]
    fn removing_out_of_range_image_is_ignored() {
        let mut draft = filled();

        assert!(draft.remove_image(3).is_none());
        assert_eq!(draft.images().len(), 1);
    }

    #[test]
    fn fields_assigned_on_a_new_draft_validate() -> TestResult {
        let mut draft = WatchDraft::new();
        draft.name = "Atlas".to_string();
        draft.company = "Breitling".to_string();
        draft.model_number = "BR-6".to_string();
        draft.price = "9800".to_string();
        draft.description = "Pilot chronograph".to_string();
        draft.add_images([vec![0xFF, 0xD8, 0xFF]]);

        let details = draft.validate()?;

        assert_eq!(details.name, "Atlas");
        assert_eq!(details.price, 9_800);
        assert!(!details.is_featured);

        Ok(())
    }

    #[test]
    fn edit_form_starts_from_the_watch() -> TestResult {
        let watch = Watch {
            id: WatchId::new(3),
            name: "Zeta".to_string(),
            description: "Diver".to_string(),
            company: "Rolex".to_string(),
            model_number: "RX-9".to_string(),
            gender: Gender::Men,
            price: 12_000,
            is_featured: false,
            images: smallvec![vec![9], vec![8]],
        };

        let draft = WatchDraft::from_watch(&watch);

        assert_eq!(draft.price, "12000");
        assert_eq!(draft.images().len(), 2);
        assert_eq!(draft.validate()?, watch.details());

        Ok(())
    }
}
