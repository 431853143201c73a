//! Search seam: raw listings in, ranked offers out

pub mod catalog;
pub mod listing;

pub use catalog::CatalogProvider;
pub use listing::Listing;

use crate::config::ScoringWeights;
use crate::error::Result;
use crate::scoring;
use crate::selection::dedupe;
use crate::types::Offer;
use async_trait::async_trait;

/// Queries shorter than this (after trimming) are not sent to a provider
pub const MIN_QUERY_LEN: usize = 3;

/// Source of listings for a free-text query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Listing>>;

    async fn suggestions(&self, query: &str) -> Vec<String>;
}

/// Search, normalize, deduplicate by id and rank best-first
pub async fn search_offers(
    provider: &dyn SearchProvider,
    query: &str,
    weights: &ScoringWeights,
) -> Result<Vec<Offer>> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        return Ok(Vec::new());
    }

    let listings = provider.search(query).await?;
    let mut offers = dedupe(listings.into_iter().map(Offer::from_listing).collect());
    scoring::rank(&mut offers, weights);
    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferId;

    struct Fixed(Vec<Listing>);

    #[async_trait]
    impl SearchProvider for Fixed {
        async fn search(&self, _query: &str) -> Result<Vec<Listing>> {
            Ok(self.0.clone())
        }

        async fn suggestions(&self, _query: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_search_offers_ranks_catalog_results() {
        let offers = search_offers(&CatalogProvider::new(), "plumber", &ScoringWeights::default())
            .await
            .unwrap();

        // p3: 75.0, p1: 78.5, p2: 107.0
        let ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
    }

    #[tokio::test]
    async fn test_search_offers_dedupes_first_wins() {
        let provider = Fixed(vec![
            Listing::new("a", "First", "").price("₹100"),
            Listing::new("a", "Second", "").price("₹1"),
            Listing::new("b", "Other", "").price("₹100"),
        ]);

        let offers = search_offers(&provider, "anything", &ScoringWeights::default())
            .await
            .unwrap();

        assert_eq!(offers.len(), 2);
        let a = offers.iter().find(|o| o.id == OfferId::from("a")).unwrap();
        assert_eq!(a.title, "First");
    }

    #[tokio::test]
    async fn test_short_query_skips_provider() {
        let provider = Fixed(vec![Listing::new("a", "A", "")]);
        let offers = search_offers(&provider, "ab", &ScoringWeights::default())
            .await
            .unwrap();
        assert!(offers.is_empty());
    }
}
