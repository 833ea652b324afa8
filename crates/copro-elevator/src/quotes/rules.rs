use super::config::ComparisonRules;
use super::{Quote, QuoteScores};

pub(crate) fn score_quote(quote: &Quote, rules: &ComparisonRules) -> QuoteScores {
    QuoteScores {
        price: price_score(&quote.vendor, rules),
        capacity: capacity_score(quote.capacity_kg, rules),
        accessibility: accessibility_score(quote.accessible),
        speed: speed_score(quote.duration.as_deref().unwrap_or_default()),
        maintenance: maintenance_score(quote.maintenance_pretax, rules),
        floors: floors_score(quote.floors_served, rules),
    }
}

fn price_score(vendor: &str, rules: &ComparisonRules) -> u8 {
    rules
        .price_scores
        .get(vendor)
        .copied()
        .unwrap_or(rules.default_price_score)
}

fn capacity_score(capacity_kg: Option<u32>, rules: &ComparisonRules) -> u8 {
    if capacity_kg.unwrap_or(0) >= rules.capacity_threshold_kg {
        5
    } else {
        3
    }
}

fn accessibility_score(accessible: bool) -> u8 {
    if accessible {
        5
    } else {
        2
    }
}

// Substring heuristic over the free-text duration; order of checks matters.
fn speed_score(duration: &str) -> u8 {
    if duration.contains("20") || duration.contains("22") {
        2
    } else if duration.contains("5,5") || duration.contains("5.5") {
        3
    } else if duration.contains('4') {
        5
    } else {
        4
    }
}

fn maintenance_score(maintenance: Option<f64>, rules: &ComparisonRules) -> u8 {
    match maintenance {
        Some(amount) if amount > 0.0 && amount <= rules.maintenance_top_threshold => 5,
        Some(amount) if amount > 0.0 && amount <= rules.maintenance_mid_threshold => 4,
        _ => 3,
    }
}

fn floors_score(floors_served: Option<u8>, rules: &ComparisonRules) -> u8 {
    if floors_served == Some(rules.full_floor_count) {
        5
    } else {
        3
    }
}
