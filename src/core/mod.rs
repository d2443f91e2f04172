pub mod engine;
pub mod entitlement;
pub mod ladder;
pub mod rescale;
pub mod upsell;

pub use crate::domain::model::{
    EntitlementResult, OrderLine, RescaleBase, RescaleResult, SchemeEvaluation, SchemeScope,
    SchemeStatus, SchemeTier, UpsellSuggestion,
};
pub use crate::domain::ports::{ConfigProvider, SlabStore};
pub use crate::utils::error::Result;
