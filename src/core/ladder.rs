use crate::domain::model::SchemeTier;
use std::collections::BTreeMap;

/// Explicit and virtual tiers, strictly ascending by `min_qty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ladder {
    tiers: Vec<SchemeTier>,
    ceiling: i64,
}

impl Ladder {
    pub fn tiers(&self) -> &[SchemeTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// The quantity the virtual walk was required to reach; 0 for an empty ladder.
    pub fn ceiling(&self) -> i64 {
        self.ceiling
    }

    /// 最小門檻（基準層）
    pub fn base(&self) -> Option<&SchemeTier> {
        self.tiers.first()
    }

    pub fn max_min_qty(&self) -> Option<i64> {
        self.tiers.last().map(|tier| tier.min_qty)
    }
}

/// Drops malformed tiers and sorts the rest by `min_qty`.
///
/// When two tiers declare the same `min_qty` the one declared first is kept.
pub fn normalize_tiers(explicit: &[SchemeTier]) -> Vec<SchemeTier> {
    let mut tiers: Vec<SchemeTier> = explicit
        .iter()
        .filter(|tier| {
            if !tier.is_well_formed() {
                tracing::warn!(
                    "Skipping malformed tier (min_qty={}, free_qty={}) of scheme '{}'",
                    tier.min_qty,
                    tier.free_qty,
                    tier.scheme_id
                );
            }
            tier.is_well_formed()
        })
        .cloned()
        .map(|mut tier| {
            tier.is_virtual = false;
            tier
        })
        .collect();

    // 穩定排序，重複門檻保留先宣告者
    tiers.sort_by_key(|tier| tier.min_qty);
    tiers.dedup_by(|later, earlier| {
        let duplicate = later.min_qty == earlier.min_qty;
        if duplicate {
            tracing::warn!(
                "Duplicate tier at min_qty={} (scheme '{}'), keeping the first declared",
                later.min_qty,
                later.scheme_id
            );
        }
        duplicate
    });
    tiers
}

/// Builds the ladder for `order_qty` from the declared tiers of one scheme.
///
/// The base tier's ratio is repeated at every multiple of its `min_qty` until the walk reaches
/// `max(2 * order_qty, 10 * base.min_qty)`. Explicit tiers replace the virtual rung at the same
/// quantity and are always present, including those off the base multiples.
pub fn expand(explicit: &[SchemeTier], order_qty: i64) -> Ladder {
    let tiers = normalize_tiers(explicit);
    let Some(base) = tiers.first() else {
        return Ladder::default();
    };

    let ceiling = order_qty
        .saturating_mul(2)
        .max(base.min_qty.saturating_mul(10));

    let mut rungs: BTreeMap<i64, SchemeTier> = BTreeMap::new();
    let mut multiplier: i64 = 1;
    loop {
        let current_qty = base.min_qty.saturating_mul(multiplier);
        rungs.insert(
            current_qty,
            SchemeTier {
                min_qty: current_qty,
                free_qty: base.free_qty.saturating_mul(multiplier),
                percent: base.percent,
                scheme_id: base.scheme_id.clone(),
                scheme_name: base.scheme_name.clone(),
                is_virtual: true,
            },
        );
        if current_qty >= ceiling {
            break;
        }
        multiplier += 1;
    }

    for tier in &tiers {
        rungs.insert(tier.min_qty, tier.clone());
    }

    tracing::debug!(
        "Expanded {} declared tiers into {} rungs (base {}:{}, ceiling {})",
        tiers.len(),
        rungs.len(),
        base.min_qty,
        base.free_qty,
        ceiling
    );

    Ladder {
        tiers: rungs.into_values().collect(),
        ceiling,
    }
}
