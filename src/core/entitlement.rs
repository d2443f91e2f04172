use crate::core::ladder::Ladder;
use crate::domain::model::EntitlementResult;

/// Free goods already earned by `order_qty`.
///
/// Picks the highest rung whose `min_qty` does not exceed the quantity and reads its `free_qty`
/// as is. Rungs are never summed.
pub fn evaluate(order_qty: i64, ladder: &Ladder) -> EntitlementResult {
    if order_qty <= 0 || ladder.is_empty() {
        return EntitlementResult::none();
    }

    let tiers = ladder.tiers();
    // 階梯已排序，取最後一個 min_qty <= order_qty 的層級
    let qualifying = tiers.partition_point(|tier| tier.min_qty <= order_qty);
    match qualifying.checked_sub(1).map(|index| &tiers[index]) {
        Some(tier) => EntitlementResult {
            free_qty: tier.free_qty,
            applied_slab: Some(tier.clone()),
        },
        None => EntitlementResult::none(),
    }
}
