use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一個數量門檻及其贈品數量。`percent` 僅供顯示，不參與計算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeTier {
    pub min_qty: i64,
    pub free_qty: i64,
    pub percent: f64,
    pub scheme_id: String,
    pub scheme_name: String,
    #[serde(default)]
    pub is_virtual: bool,
}

impl SchemeTier {
    pub fn new(min_qty: i64, free_qty: i64, percent: f64) -> Self {
        Self {
            min_qty,
            free_qty,
            percent,
            scheme_id: String::new(),
            scheme_name: String::new(),
            is_virtual: false,
        }
    }

    pub fn with_scheme(mut self, scheme_id: impl Into<String>, scheme_name: impl Into<String>) -> Self {
        self.scheme_id = scheme_id.into();
        self.scheme_name = scheme_name.into();
        self
    }

    /// Malformed tiers are filtered out before a ladder is built.
    pub fn is_well_formed(&self) -> bool {
        self.min_qty > 0 && self.free_qty >= 0
    }
}

/// 客戶專屬或事業部共用的方案歸屬
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Customer(String),
    Division(String),
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Customer(code) => write!(f, "customer:{}", code),
            Party::Division(code) => write!(f, "division:{}", code),
        }
    }
}

/// Lookup key for a scheme definition: (product, customer|division).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemeScope {
    pub product_code: String,
    pub party: Party,
}

impl SchemeScope {
    pub fn for_customer(product_code: impl Into<String>, customer_code: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            party: Party::Customer(customer_code.into()),
        }
    }

    pub fn for_division(product_code: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            party: Party::Division(division.into()),
        }
    }
}

impl fmt::Display for SchemeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product_code, self.party)
    }
}

/// A master-data row: one declared tier plus its validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub scope: SchemeScope,
    pub tier: SchemeTier,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl SchemeRecord {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| from <= date)
            && self.valid_to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitlementResult {
    pub free_qty: i64,
    pub applied_slab: Option<SchemeTier>,
}

impl EntitlementResult {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsellSuggestion {
    pub next_tier: Option<SchemeTier>,
}

impl UpsellSuggestion {
    /// 距離下一個門檻還差多少
    pub fn gap(&self, order_qty: i64) -> Option<i64> {
        self.next_tier
            .as_ref()
            .map(|tier| tier.min_qty.saturating_sub(order_qty))
    }
}

/// Base ratio cached on an order line the first time it was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescaleBase {
    pub base_order_qty: i64,
    pub base_free_qty: i64,
}

impl RescaleBase {
    pub fn is_usable(&self) -> bool {
        self.base_order_qty > 0 && self.base_free_qty > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleResult {
    pub multiplier: i64,
    pub free_qty: i64,
    pub percent: f64,
}

/// 評估結果的三種狀態，UI 依此選擇提示訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeStatus {
    /// The store returned no tiers for this scope.
    NoScheme,
    /// Tiers exist but the quantity is below the smallest one.
    BelowMinimum { min_qty: i64 },
    Applied,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeEvaluation {
    pub scope: SchemeScope,
    pub order_qty: i64,
    pub status: SchemeStatus,
    pub entitlement: EntitlementResult,
    pub upsell: UpsellSuggestion,
    pub base: Option<RescaleBase>,
    pub scheme_percent: f64,
}

impl SchemeEvaluation {
    pub fn upsell_gap(&self) -> Option<i64> {
        self.upsell.gap(self.order_qty)
    }
}

/// An order line as seen by the editing surface and the persistence path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub scope: SchemeScope,
    /// 使用者手動輸入的數量
    pub manual_qty: i64,
    pub order_qty: i64,
    #[serde(default)]
    pub free_qty: i64,
    #[serde(default)]
    pub scheme_percent: f64,
    #[serde(default)]
    pub scheme_applied: bool,
    #[serde(default)]
    pub base: Option<RescaleBase>,
}

impl OrderLine {
    pub fn new(line_id: impl Into<String>, scope: SchemeScope, order_qty: i64) -> Self {
        Self {
            line_id: line_id.into(),
            scope,
            manual_qty: order_qty,
            order_qty,
            free_qty: 0,
            scheme_percent: 0.0,
            scheme_applied: false,
            base: None,
        }
    }

    /// 套用建議數量，保留原本手動輸入值以便還原
    pub fn apply_suggested_qty(&mut self, suggested_qty: i64) {
        self.order_qty = suggested_qty;
        self.scheme_applied = true;
    }

    pub fn revert_to_manual(&mut self) {
        self.order_qty = self.manual_qty;
        self.scheme_applied = false;
    }

    /// A new typed quantity replaces both the manual and current values.
    pub fn set_manual_qty(&mut self, qty: i64) {
        self.manual_qty = qty;
        self.order_qty = qty;
        self.scheme_applied = false;
    }

    pub fn qty_plus_free(&self) -> String {
        if self.free_qty > 0 {
            format!("{}+{}", self.order_qty, self.free_qty)
        } else {
            self.order_qty.to_string()
        }
    }

    pub fn is_scheme_eligible(&self) -> bool {
        self.free_qty > 0
    }
}
