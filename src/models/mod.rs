use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum number of images a listing may carry
pub const MAX_IMAGES: usize = 6;

/// Upper bound shared by every numeric control
pub const MAX_NUMERIC: f64 = 10_000_000.0;

/// Allowed length of the listing name, in characters
pub const NAME_LENGTH: std::ops::RangeInclusive<usize> = 10..=62;

/// Whether the listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sale,
    #[default]
    Rent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sale => "sale",
            Category::Rent => "rent",
        }
    }
}

/// In-progress listing record, serialized with the field names the listing API expects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    /// Ordered image URLs; the first one is the cover image
    pub image_urls: Vec<String>,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Per month when the category is rent
    pub regular_price: f64,
    /// Only meaningful while `has_offer` is set
    pub discount_price: f64,
    #[serde(rename = "offer")]
    pub has_offer: bool,
    #[serde(rename = "parking")]
    pub has_parking: bool,
    #[serde(rename = "furnished")]
    pub is_furnished: bool,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            image_urls: Vec::new(),
            name: String::new(),
            description: String::new(),
            address: String::new(),
            category: Category::Rent,
            bedrooms: 1,
            bathrooms: 1,
            regular_price: 50.0,
            discount_price: 0.0,
            has_offer: false,
            has_parking: false,
            is_furnished: false,
        }
    }
}

impl ListingDraft {
    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }

    /// Unit shown next to the price controls
    pub fn price_unit(&self) -> Option<&'static str> {
        match self.category {
            Category::Rent => Some("$ / month"),
            Category::Sale => None,
        }
    }

    /// Constraints the form controls enforce before the submit handler runs.
    /// Returns the first violation in control order.
    pub fn check_controls(&self) -> Result<(), ValidationError> {
        let name_len = self.name.chars().count();
        if !NAME_LENGTH.contains(&name_len) {
            return Err(ValidationError::control(
                "name",
                format!(
                    "must be between {} and {} characters (got {})",
                    NAME_LENGTH.start(),
                    NAME_LENGTH.end(),
                    name_len
                ),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::control("description", "is required"));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::control("address", "is required"));
        }

        check_range("bedrooms", f64::from(self.bedrooms), 1.0)?;
        check_range("bathrooms", f64::from(self.bathrooms), 1.0)?;
        check_range("regularPrice", self.regular_price, 1.0)?;

        // The discount control is only rendered while an offer is active
        if self.has_offer {
            check_range("discountPrice", self.discount_price, 0.0)?;
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= min && value <= MAX_NUMERIC {
        Ok(())
    } else {
        Err(ValidationError::control(
            field,
            format!("must be between {} and {}", min, MAX_NUMERIC),
        ))
    }
}

/// The acting user, provided read-only by the session layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Request body for `POST listing/create`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest<'a> {
    #[serde(flatten)]
    pub draft: &'a ListingDraft,
    pub user_ref: &'a str,
}

/// Listing as returned by the API after creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedListing {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub raw_data: serde_json::Map<String, serde_json::Value>,
}

/// Where the UI goes next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListingDetail(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::ListingDetail(id) => format!("/listing/{}", id),
        }
    }
}
