// Adapters layer: concrete implementations for external systems (master data, export).

pub mod export;
pub mod store;
