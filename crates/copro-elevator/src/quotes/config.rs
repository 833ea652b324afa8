use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed rubric used to score comparable elevator quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRules {
    /// Price score per vendor; not derived from the cost ranking.
    pub price_scores: BTreeMap<String, u8>,
    pub default_price_score: u8,
    pub capacity_threshold_kg: u32,
    pub maintenance_top_threshold: f64,
    pub maintenance_mid_threshold: f64,
    pub full_floor_count: u8,
    pub maintenance_vat_multiplier: f64,
    pub horizon_years: u32,
}

impl Default for ComparisonRules {
    fn default() -> Self {
        let price_scores = [("MCA", 5), ("NSA/AFL", 4), ("CEPA", 3), ("SIETRAM", 2)]
            .into_iter()
            .map(|(vendor, score)| (vendor.to_string(), score))
            .collect();

        Self {
            price_scores,
            default_price_score: 3,
            capacity_threshold_kg: 225,
            maintenance_top_threshold: 1620.0,
            maintenance_mid_threshold: 1660.0,
            full_floor_count: 7,
            maintenance_vat_multiplier: 1.20,
            horizon_years: 10,
        }
    }
}
