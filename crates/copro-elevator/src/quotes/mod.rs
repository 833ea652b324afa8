//! Vendor quote comparison.
//!
//! Quotes with both a post-tax cost and an annual maintenance cost are
//! comparable and receive five rubric scores; the others are kept for
//! reference only.

mod config;
mod rules;

pub use config::ComparisonRules;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Elevator installation quote as received from a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub vendor: String,
    pub pretax_cost: Option<f64>,
    pub posttax_cost: Option<f64>,
    pub capacity_kg: Option<u32>,
    pub capacity_persons: Option<u32>,
    pub opening_mm: Option<u32>,
    pub pit_mm: Option<u32>,
    /// Disability-access compliance (EN 81-70).
    pub accessible: bool,
    pub floors_served: Option<u8>,
    pub maintenance_pretax: Option<f64>,
    pub duration: Option<String>,
    pub remarks: Option<String>,
    pub recommended: bool,
}

impl Quote {
    pub fn is_comparable(&self) -> bool {
        matches!(self.posttax_cost, Some(cost) if cost > 0.0) && self.maintenance_pretax.is_some()
    }

    /// Installation plus `horizon_years` of maintenance with VAT applied.
    pub fn total_cost_over_horizon(&self, rules: &ComparisonRules) -> Option<f64> {
        let installation = self.posttax_cost?;
        let maintenance = self.maintenance_pretax?;
        Some(
            installation
                + f64::from(rules.horizon_years) * maintenance * rules.maintenance_vat_multiplier,
        )
    }
}

/// Rubric scores, each between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteScores {
    pub price: u8,
    pub capacity: u8,
    pub accessibility: u8,
    pub speed: u8,
    pub maintenance: u8,
    pub floors: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredQuote {
    #[serde(flatten)]
    pub quote: Quote,
    pub ten_year_cost: Option<f64>,
    pub scores: QuoteScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceQuote {
    #[serde(flatten)]
    pub quote: Quote,
    pub ten_year_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteComparison {
    pub comparables: Vec<ScoredQuote>,
    pub reference: Vec<ReferenceQuote>,
    /// Vendor of the flagged comparable, else the first comparable.
    pub recommended: Option<String>,
}

impl QuoteComparison {
    pub fn recommended_quote(&self) -> Option<&ScoredQuote> {
        let vendor = self.recommended.as_deref()?;
        self.comparables
            .iter()
            .find(|scored| scored.quote.vendor == vendor)
    }
}

/// Stateless comparator applying the rubric to a quote set.
pub struct QuoteComparator {
    rules: ComparisonRules,
}

impl QuoteComparator {
    pub fn new(rules: ComparisonRules) -> Self {
        Self { rules }
    }

    pub fn compare(&self, quotes: &[Quote]) -> QuoteComparison {
        let mut comparables = Vec::new();
        let mut reference = Vec::new();

        for quote in quotes {
            let ten_year_cost = quote.total_cost_over_horizon(&self.rules);
            if quote.is_comparable() {
                comparables.push(ScoredQuote {
                    quote: quote.clone(),
                    ten_year_cost,
                    scores: rules::score_quote(quote, &self.rules),
                });
            } else {
                reference.push(ReferenceQuote {
                    quote: quote.clone(),
                    ten_year_cost,
                });
            }
        }

        let recommended = comparables
            .iter()
            .find(|scored| scored.quote.recommended)
            .or_else(|| comparables.first())
            .map(|scored| scored.quote.vendor.clone());

        debug!(
            comparables = comparables.len(),
            reference = reference.len(),
            recommended = recommended.as_deref().unwrap_or("none"),
            "quotes compared"
        );

        QuoteComparison {
            comparables,
            reference,
            recommended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(vendor: &str, cost: Option<f64>, maintenance: Option<f64>) -> Quote {
        Quote {
            vendor: vendor.to_string(),
            pretax_cost: cost.map(|value| value / 1.055),
            posttax_cost: cost,
            capacity_kg: Some(230),
            capacity_persons: Some(3),
            opening_mm: Some(700),
            pit_mm: Some(350),
            accessible: true,
            floors_served: Some(7),
            maintenance_pretax: maintenance,
            duration: Some("4 weeks".to_string()),
            remarks: None,
            recommended: false,
        }
    }

    #[test]
    fn incomplete_quotes_are_reference_only() {
        let comparator = QuoteComparator::new(ComparisonRules::default());
        let comparison = comparator.compare(&[
            quote("MCA", Some(180_000.0), Some(1600.0)),
            quote("OTIS", Some(150_000.0), None),
            quote("KONE", None, Some(1500.0)),
        ]);

        assert_eq!(comparison.comparables.len(), 1);
        assert_eq!(comparison.reference.len(), 2);
        assert_eq!(comparison.reference[0].ten_year_cost, None);
        assert_eq!(comparison.reference[1].ten_year_cost, None);
    }

    #[test]
    fn ten_year_cost_applies_vat_on_maintenance() {
        let rules = ComparisonRules::default();
        let total = quote("MCA", Some(180_000.0), Some(1600.0))
            .total_cost_over_horizon(&rules)
            .expect("complete quote");
        assert!((total - 199_200.0).abs() < 1e-6);
    }

    #[test]
    fn recommendation_falls_back_to_first_comparable() {
        let comparator = QuoteComparator::new(ComparisonRules::default());
        let comparison = comparator.compare(&[
            quote("OTIS", Some(150_000.0), None),
            quote("CEPA", Some(181_123.0), Some(1700.0)),
            quote("MCA", Some(156_170.0), Some(1600.0)),
        ]);

        assert_eq!(comparison.recommended.as_deref(), Some("CEPA"));
        assert_eq!(
            comparison
                .recommended_quote()
                .map(|scored| scored.scores.price),
            Some(3)
        );
    }

    #[test]
    fn no_comparable_quotes_means_no_recommendation() {
        let comparator = QuoteComparator::new(ComparisonRules::default());
        let comparison = comparator.compare(&[quote("OTIS", Some(150_000.0), None)]);
        assert!(comparison.recommended.is_none());
        assert!(comparison.recommended_quote().is_none());
    }
}
