//! Core types used throughout Haggle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an offer, unique within one result set
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferId(pub String);

impl OfferId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OfferId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque reference to the vendor behind an offer
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl VendorRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
        }
    }
}

impl fmt::Display for VendorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.name, location),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Currencies recognised in listing price strings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Map a leading currency symbol to its currency
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '₹' => Some(Currency::INR),
            '$' => Some(Currency::USD),
            '€' => Some(Currency::EUR),
            '£' => Some(Currency::GBP),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Currency::INR => '₹',
            Currency::USD => '$',
            Currency::EUR => '€',
            Currency::GBP => '£',
        }
    }
}

/// A currency-tagged price as advertised by a vendor.
///
/// `label` keeps the original text ("₹500/hr"); `amount` is the first
/// number found in it after the currency symbol is stripped, or `None` when
/// the text carries no number at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub label: String,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
}

impl Price {
    /// Parse a free-form price string
    pub fn parse(label: &str) -> Self {
        let currency = label.chars().find_map(Currency::from_symbol);
        let stripped: String = label
            .chars()
            .filter(|c| Currency::from_symbol(*c).is_none())
            .collect();

        Self {
            label: label.to_string(),
            amount: parse_leading_number(&stripped),
            currency,
        }
    }

    /// Build a price from an already numeric amount
    pub fn from_amount(amount: f64, currency: Option<Currency>) -> Self {
        let label = match currency {
            Some(c) => format!("{}{}", c.symbol(), format_amount(amount)),
            None => format_amount(amount),
        };
        Self {
            label,
            amount: Some(amount),
            currency,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

/// Extract the first decimal number in `text`, ignoring thousands separators.
fn parse_leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    number.trim_end_matches('.').parse().ok()
}

/// Convert availability text ("45 mins", "No wait", "Next 24 hours") to minutes
pub fn parse_availability(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if text.contains("no wait") || text == "now" || text.contains("immediate") {
        return Some(0);
    }

    let start = text.find(|c: char| c.is_ascii_digit())?;
    let value: u32 = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()?;

    let unit = &text[start..];
    if unit.contains("day") {
        value.checked_mul(24 * 60)
    } else if unit.contains("hour") || unit.contains("hr") {
        value.checked_mul(60)
    } else {
        Some(value)
    }
}

/// A candidate result returned by search. Immutable once fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub availability_minutes: Option<u32>,
    /// 0.0 to 5.0
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub vendor: VendorRef,
}

impl Offer {
    /// Minimal offer; optional fields can be filled in with the `with_*` helpers
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: &str, vendor: VendorRef) -> Self {
        Self {
            id: OfferId::new(id),
            title: title.into(),
            description: String::new(),
            price: Price::parse(price),
            original_price: None,
            availability_minutes: None,
            rating: None,
            review_count: None,
            vendor,
        }
    }

    pub fn with_availability(mut self, minutes: u32) -> Self {
        self.availability_minutes = Some(minutes);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating.clamp(0.0, 5.0));
        self
    }

    pub fn with_reviews(mut self, count: u32) -> Self {
        self.review_count = Some(count);
        self
    }
}
