//! Raw listings and their normalization into offers

use crate::types::{parse_availability, Offer, OfferId, Price, VendorRef};
use serde::{Deserialize, Serialize};

/// A listing as returned by a search provider, before normalization
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub availability: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<u32>,
    pub vendor: Option<VendorRef>,
}

impl Listing {
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn price(mut self, price: &str) -> Self {
        self.price = Some(price.to_string());
        self
    }

    pub fn availability(mut self, availability: &str) -> Self {
        self.availability = Some(availability.to_string());
        self
    }

    pub fn rated(mut self, rating: f64, reviews: u32) -> Self {
        self.rating = Some(rating);
        self.reviews = Some(reviews);
        self
    }

    pub fn vendor(mut self, vendor: VendorRef) -> Self {
        self.vendor = Some(vendor);
        self
    }
}

impl Offer {
    /// Normalize a raw listing.
    ///
    /// Missing prices become an unparsable (amount-less) price, availability
    /// text is converted to minutes, ratings are clamped to 0..=5 and a
    /// listing without vendor information is attributed to itself.
    pub fn from_listing(listing: Listing) -> Self {
        let vendor = listing
            .vendor
            .unwrap_or_else(|| VendorRef::new(listing.id.clone(), listing.title.clone()));

        Self {
            id: OfferId(listing.id),
            title: listing.title,
            description: listing.description,
            price: Price::parse(listing.price.as_deref().unwrap_or_default()),
            original_price: listing.original_price.as_deref().map(Price::parse),
            availability_minutes: listing.availability.as_deref().and_then(parse_availability),
            rating: listing
                .rating
                .filter(|r| r.is_finite())
                .map(|r| r.clamp(0.0, 5.0)),
            review_count: listing.reviews,
            vendor,
        }
    }
}
