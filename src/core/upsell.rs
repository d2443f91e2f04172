use crate::core::ladder::Ladder;
use crate::domain::model::UpsellSuggestion;

/// The smallest rung strictly above `order_qty`, if the ladder has one.
pub fn suggest(order_qty: i64, ladder: &Ladder) -> UpsellSuggestion {
    let tiers = ladder.tiers();
    let next = tiers.partition_point(|tier| tier.min_qty <= order_qty);
    UpsellSuggestion {
        next_tier: tiers.get(next).cloned(),
    }
}
