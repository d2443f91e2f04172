use crate::domain::model::{RescaleBase, RescaleResult};

/// Rounds to two decimal places, the precision stored on order lines.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Effective scheme percent of an order line: free goods over ordered quantity.
pub fn scheme_percent(free_qty: i64, order_qty: i64) -> f64 {
    if free_qty > 0 && order_qty > 0 {
        round_percent(free_qty as f64 / order_qty as f64 * 100.0)
    } else {
        0.0
    }
}

/// Recomputes free goods from a cached base ratio without rebuilding the ladder.
///
/// Returns `None` when the base is unusable; callers then leave the line untouched.
/// Agrees with `entitlement::evaluate(&ladder::expand(..))` whenever the base is the scheme's
/// base tier and no explicit tier departs from its ratio.
pub fn rescale(new_order_qty: i64, base: RescaleBase) -> Option<RescaleResult> {
    if !base.is_usable() {
        return None;
    }

    if new_order_qty <= 0 {
        return Some(RescaleResult {
            multiplier: 0,
            free_qty: 0,
            percent: 0.0,
        });
    }

    let multiplier = new_order_qty / base.base_order_qty;
    let free_qty = multiplier.saturating_mul(base.base_free_qty);
    Some(RescaleResult {
        multiplier,
        free_qty,
        percent: scheme_percent(free_qty, new_order_qty),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(base_order_qty: i64, base_free_qty: i64) -> RescaleBase {
        RescaleBase {
            base_order_qty,
            base_free_qty,
        }
    }

    #[test]
    fn test_rescale_350_on_100_plus_20() {
        let result = rescale(350, base(100, 20)).unwrap();
        assert_eq!(result.multiplier, 3);
        assert_eq!(result.free_qty, 60);
        assert_eq!(result.percent, 17.14);
    }

    #[test]
    fn test_below_base_gives_zero_percent() {
        let result = rescale(99, base(100, 20)).unwrap();
        assert_eq!(result.multiplier, 0);
        assert_eq!(result.free_qty, 0);
        assert_eq!(result.percent, 0.0);
    }

    #[test]
    fn test_unusable_base_is_skipped() {
        assert!(rescale(350, base(0, 20)).is_none());
        assert!(rescale(350, base(100, 0)).is_none());
        assert!(rescale(350, base(-100, 20)).is_none());
    }

    #[test]
    fn test_non_positive_quantity_earns_nothing() {
        let result = rescale(-250, base(100, 20)).unwrap();
        assert_eq!((result.multiplier, result.free_qty, result.percent), (0, 0, 0.0));
    }

    #[test]
    fn test_scheme_percent_rounding() {
        assert_eq!(scheme_percent(20, 100), 20.0);
        assert_eq!(scheme_percent(40, 250), 16.0);
        assert_eq!(scheme_percent(1, 3), 33.33);
        assert_eq!(scheme_percent(2, 3), 66.67);
        assert_eq!(scheme_percent(0, 100), 0.0);
        assert_eq!(scheme_percent(5, 0), 0.0);
    }
}
