//! Built-in listing catalog for local service categories

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use super::listing::Listing;
use super::{SearchProvider, MIN_QUERY_LEN};

/// Phrases from marketing copy that should never be treated as a search
const MARKETING_TERMS: &[&str] = &[
    "smart ai negotiation",
    "real time bargaining",
    "verified vendors",
];

/// Categories in match order, with the related words that map onto them
const KEYWORDS: &[(&str, &[&str])] = &[
    ("plumber", &["pipe", "leak", "water", "bathroom", "sink", "toilet", "shower", "drain"]),
    ("electrician", &["wiring", "electrical", "power", "outlet", "switch", "light", "circuit", "breaker"]),
    ("taxi", &["cab", "ride", "driver", "car", "transport", "travel", "trip", "airport", "transfer"]),
    ("restaurant", &["food", "dinner", "lunch", "eat", "meal", "cuisine", "dining", "takeout", "delivery"]),
    ("handyman", &["repair", "fix", "install", "home", "house", "maintenance", "assembly"]),
    ("mechanic", &["car", "auto", "vehicle", "repair", "service", "engine", "maintenance"]),
];

const SUGGESTIONS: &[(&str, &[&str])] = &[
    ("plumber", &["fix leaking pipe", "bathroom renovation", "install new sink", "water heater repair"]),
    ("electrician", &["ceiling fan installation", "fix wiring issue", "lighting upgrade", "circuit breaker repair"]),
    ("taxi", &["airport transfer", "city tour", "outstation trip", "hourly city cab"]),
    ("restaurant", &["dinner reservation", "lunch buffet", "family dining", "outdoor seating"]),
    ("handyman", &["furniture assembly", "home repairs", "painting service", "door installation"]),
    ("mechanic", &["car service", "engine repair", "wheel alignment", "brake replacement"]),
];

/// In-process provider over a fixed set of categorised listings
pub struct CatalogProvider {
    listings: HashMap<&'static str, Vec<Listing>>,
}

impl CatalogProvider {
    pub fn new() -> Self {
        let mut listings = HashMap::new();

        listings.insert(
            "plumber",
            vec![
                Listing::new(
                    "p1",
                    "Rajesh Plumbing Services",
                    "Professional plumbing with 10+ years experience. Specializing in pipe repairs, installation and bathroom fixtures.",
                )
                .price("₹500/hr")
                .availability("45 mins")
                .rated(4.7, 32),
                Listing::new(
                    "p2",
                    "Quick Fix Plumbers",
                    "Emergency plumbing services available 24/7. Fast response time and quality workmanship guaranteed.",
                )
                .price("₹650/hr")
                .availability("20 mins")
                .rated(4.9, 46),
                Listing::new(
                    "p3",
                    "City Plumbing Solutions",
                    "Commercial and residential plumbing. Free inspection and quotes for all new customers.",
                )
                .price("₹450/hr")
                .availability("60 mins")
                .rated(4.5, 28),
            ],
        );

        listings.insert(
            "electrician",
            vec![
                Listing::new(
                    "e1",
                    "PowerPro Electricians",
                    "Licensed electricians for all residential and commercial needs. Safety certified and insured professionals.",
                )
                .price("₹600/hr")
                .availability("30 mins")
                .rated(4.8, 42),
                Listing::new(
                    "e2",
                    "Voltage Masters",
                    "Specializing in electrical panel upgrades, wiring, and smart home installations. 24/7 emergency service.",
                )
                .price("₹550/hr")
                .availability("45 mins")
                .rated(4.6, 35),
                Listing::new(
                    "e3",
                    "Reliable Electric",
                    "Family owned business with 15+ years experience. Residential rewiring, fixtures, and repairs.",
                )
                .price("₹500/hr")
                .availability("60 mins")
                .rated(4.3, 24),
            ],
        );

        listings.insert(
            "taxi",
            vec![
                Listing::new(
                    "t1",
                    "City Cab Services",
                    "Reliable taxi service for city travel and airport transfers. Clean cars and professional drivers.",
                )
                .price("₹200/km")
                .availability("10 mins")
                .rated(4.5, 87),
                Listing::new(
                    "t2",
                    "Premium Airport Transfers",
                    "Luxury vehicles for airport pick-up and drop-off. Fixed rates and no hidden charges.",
                )
                .price("₹1500 fixed rate")
                .availability("25 mins")
                .rated(4.8, 52),
                Listing::new(
                    "t3",
                    "Outstation Travel Specialists",
                    "Comfortable long distance travel services. Experienced drivers and well-maintained vehicles.",
                )
                .price("₹15/km")
                .availability("45 mins")
                .rated(4.6, 38),
            ],
        );

        listings.insert(
            "restaurant",
            vec![
                Listing::new(
                    "r1",
                    "Spice Garden Restaurant",
                    "Authentic Indian cuisine with modern twists. Perfect for family dining with vegetarian and non-vegetarian options.",
                )
                .price("₹500 for two")
                .availability("15 mins wait")
                .rated(4.4, 123),
                Listing::new(
                    "r2",
                    "Oceanfront Seafood",
                    "Fresh seafood prepared in various international styles. Beautiful ambiance with seafront dining.",
                )
                .price("₹800 for two")
                .availability("30 mins wait")
                .rated(4.7, 95),
                Listing::new(
                    "r3",
                    "Urban Cafe & Bistro",
                    "Casual dining with international menu options. Great for breakfast, lunch, and dinner.",
                )
                .price("₹400 for two")
                .availability("No wait")
                .rated(4.2, 78),
            ],
        );

        Self { listings }
    }

    /// Category a query resolves to: a direct category name first, then
    /// the first category with a related keyword in the query
    fn category_for(query: &str) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .map(|(category, _)| *category)
            .find(|category| query.contains(category))
            .or_else(|| {
                KEYWORDS
                    .iter()
                    .find(|(_, words)| words.iter().any(|w| query.contains(w)))
                    .map(|(category, _)| *category)
            })
    }

    fn general_results(query: &str) -> Vec<Listing> {
        vec![
            Listing::new(
                "g1",
                &format!("{} - Available Services", query),
                &format!(
                    "Top rated services for \"{}\" with verified professionals and best market rates.",
                    query
                ),
            )
            .price("₹500")
            .availability("30 mins")
            .rated(4.8, 42),
            Listing::new(
                "g2",
                &format!("{} Solutions", query),
                &format!("Expert assistance for {} with guaranteed customer satisfaction.", query),
            )
            .price("₹450")
            .availability("45 mins")
            .rated(4.5, 36),
            Listing::new(
                "g3",
                &format!("Budget {} Options", query),
                &format!("Affordable and reliable {} services for every need and budget.", query),
            )
            .price("₹350")
            .availability("60 mins")
            .rated(4.2, 28),
        ]
    }
}

impl Default for CatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for CatalogProvider {
    async fn search(&self, query: &str) -> Result<Vec<Listing>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let clean = trimmed.to_lowercase();
        if MARKETING_TERMS.iter().any(|term| clean.contains(term)) {
            tracing::debug!("Ignoring marketing phrase as search query: {}", trimmed);
            return Ok(Vec::new());
        }

        let results = match Self::category_for(&clean) {
            Some(category) => self.listings.get(category).cloned().unwrap_or_default(),
            None => Self::general_results(trimmed),
        };

        tracing::debug!("Search '{}' returned {} listings", trimmed, results.len());
        Ok(results)
    }

    async fn suggestions(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();
        let clean = trimmed.to_lowercase();

        if let Some((category, phrases)) = SUGGESTIONS
            .iter()
            .find(|(category, _)| clean.contains(category))
        {
            return phrases
                .iter()
                .map(|phrase| format!("{} - {} service", phrase, category))
                .collect();
        }

        vec![
            format!("{} services near me", trimmed),
            format!("Best {} in town", trimmed),
            format!("Affordable {} options", trimmed),
            format!("{} with discounts", trimmed),
            format!("Top rated {} professionals", trimmed),
        ]
    }
}
