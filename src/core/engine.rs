use crate::core::{entitlement, ladder, rescale, upsell};
use crate::domain::model::{
    OrderLine, RescaleBase, SchemeEvaluation, SchemeScope, SchemeStatus, SchemeTier,
};
use crate::domain::ports::SlabStore;
use crate::utils::error::Result;

/// Runs the full pipeline over tiers the caller already holds.
///
/// Both the preview path and the commit path end up here, so the two can only disagree if they
/// were handed different tiers.
pub fn evaluate_declared(scope: &SchemeScope, declared: &[SchemeTier], order_qty: i64) -> SchemeEvaluation {
    let ladder = ladder::expand(declared, order_qty);
    let entitlement = entitlement::evaluate(order_qty, &ladder);
    let upsell = upsell::suggest(order_qty, &ladder);

    let base = ladder.base().map(|tier| RescaleBase {
        base_order_qty: tier.min_qty,
        base_free_qty: tier.free_qty,
    });

    let status = match (&base, &entitlement.applied_slab) {
        (None, _) => SchemeStatus::NoScheme,
        (Some(base), None) => SchemeStatus::BelowMinimum {
            min_qty: base.base_order_qty,
        },
        (Some(_), Some(_)) => SchemeStatus::Applied,
    };

    let scheme_percent = rescale::scheme_percent(entitlement.free_qty, order_qty);

    SchemeEvaluation {
        scope: scope.clone(),
        order_qty,
        status,
        entitlement,
        upsell,
        base,
        scheme_percent,
    }
}

pub struct SchemeEngine<S: SlabStore> {
    store: S,
}

impl<S: SlabStore> SchemeEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn evaluate(&self, scope: &SchemeScope, order_qty: i64) -> Result<SchemeEvaluation> {
        let declared = self.store.declared_tiers(scope).await?;
        tracing::debug!("Loaded {} declared tiers for {}", declared.len(), scope);

        let evaluation = evaluate_declared(scope, &declared, order_qty);
        tracing::debug!(
            "{} qty={} -> status={:?} free={}",
            scope,
            order_qty,
            evaluation.status,
            evaluation.entitlement.free_qty
        );
        Ok(evaluation)
    }

    /// 預覽：不修改訂單行
    pub async fn preview_line(&self, line: &OrderLine) -> Result<SchemeEvaluation> {
        self.evaluate(&line.scope, line.order_qty).await
    }

    /// Authoritative recompute before persistence.
    ///
    /// Tiers are always fetched again from the store; nothing computed by a preview is reused.
    /// The base ratio is cached on the line the first time it is seen.
    pub async fn commit_line(&self, line: &mut OrderLine) -> Result<SchemeEvaluation> {
        let evaluation = self.evaluate(&line.scope, line.order_qty).await?;

        line.free_qty = evaluation.entitlement.free_qty;
        line.scheme_percent = evaluation.scheme_percent;
        if line.base.is_none() {
            line.base = evaluation.base;
        }

        tracing::info!(
            "Committed line {} ({}): {}",
            line.line_id,
            line.scope,
            line.qty_plus_free()
        );
        Ok(evaluation)
    }

    /// Commits each line in order, stopping at the first store failure.
    pub async fn commit_lines(&self, lines: &mut [OrderLine]) -> Result<Vec<SchemeEvaluation>> {
        let mut evaluations = Vec::with_capacity(lines.len());
        for line in lines.iter_mut() {
            evaluations.push(self.commit_line(line).await?);
        }
        Ok(evaluations)
    }
}

impl OrderLine {
    /// Fast edit path: rescales free goods from the cached base ratio.
    ///
    /// Returns false and leaves `free_qty`/`scheme_percent` untouched when no usable base is cached.
    pub fn rescale_to(&mut self, new_order_qty: i64) -> bool {
        self.set_manual_qty(new_order_qty);
        match self.base.and_then(|base| rescale::rescale(new_order_qty, base)) {
            Some(result) => {
                self.free_qty = result.free_qty;
                self.scheme_percent = result.percent;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemorySlabStore;

    fn scope() -> SchemeScope {
        SchemeScope::for_customer("P100", "C001")
    }

    fn store_with(tiers: Vec<SchemeTier>) -> InMemorySlabStore {
        let mut store = InMemorySlabStore::default();
        for tier in tiers {
            store.insert(scope(), tier);
        }
        store
    }

    #[test]
    fn test_no_scheme_is_distinct_from_below_minimum() {
        let none = evaluate_declared(&scope(), &[], 50);
        assert_eq!(none.status, SchemeStatus::NoScheme);
        assert_eq!(none.base, None);

        let below = evaluate_declared(&scope(), &[SchemeTier::new(100, 20, 20.0)], 50);
        assert_eq!(below.status, SchemeStatus::BelowMinimum { min_qty: 100 });
        assert_eq!(below.entitlement.free_qty, 0);
        assert_eq!(below.upsell_gap(), Some(50));
    }

    #[test]
    fn test_applied_evaluation_carries_percent_and_base() {
        let evaluation = evaluate_declared(&scope(), &[SchemeTier::new(100, 20, 20.0)], 250);
        assert_eq!(evaluation.status, SchemeStatus::Applied);
        assert_eq!(evaluation.entitlement.free_qty, 40);
        assert_eq!(evaluation.scheme_percent, 16.0);
        assert_eq!(
            evaluation.base,
            Some(RescaleBase {
                base_order_qty: 100,
                base_free_qty: 20
            })
        );
        assert_eq!(evaluation.upsell_gap(), Some(50));
    }

    #[tokio::test]
    async fn test_commit_line_writes_fields_and_caches_base() {
        let engine = SchemeEngine::new(store_with(vec![SchemeTier::new(100, 20, 20.0)]));
        let mut line = OrderLine::new("L1", scope(), 350);

        let evaluation = engine.commit_line(&mut line).await.unwrap();
        assert_eq!(evaluation.status, SchemeStatus::Applied);
        assert_eq!(line.free_qty, 60);
        assert_eq!(line.scheme_percent, 17.14);
        assert_eq!(line.qty_plus_free(), "350+60");
        assert!(line.base.is_some());
    }

    #[tokio::test]
    async fn test_preview_does_not_mutate() {
        let engine = SchemeEngine::new(store_with(vec![SchemeTier::new(100, 20, 20.0)]));
        let line = OrderLine::new("L1", scope(), 350);
        let before = line.clone();

        let evaluation = engine.preview_line(&line).await.unwrap();
        assert_eq!(evaluation.entitlement.free_qty, 60);
        assert_eq!(line, before);
    }

    #[tokio::test]
    async fn test_rescale_matches_commit_after_edit() {
        let engine = SchemeEngine::new(store_with(vec![SchemeTier::new(100, 20, 20.0)]));
        let mut line = OrderLine::new("L1", scope(), 100);
        engine.commit_line(&mut line).await.unwrap();

        assert!(line.rescale_to(730));
        let fast = (line.free_qty, line.scheme_percent);

        engine.commit_line(&mut line).await.unwrap();
        assert_eq!((line.free_qty, line.scheme_percent), fast);
        assert_eq!(line.free_qty, 140);
    }

    #[test]
    fn test_rescale_without_base_leaves_values() {
        let mut line = OrderLine::new("L1", scope(), 100);
        line.free_qty = 20;
        line.scheme_percent = 20.0;

        assert!(!line.rescale_to(300));
        assert_eq!(line.order_qty, 300);
        assert_eq!((line.free_qty, line.scheme_percent), (20, 20.0));
    }
}
