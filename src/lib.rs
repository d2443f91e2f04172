pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::store::InMemorySlabStore;
pub use app::{BatchReport, BatchRunner};
pub use config::BatchConfig;
pub use core::engine::{evaluate_declared, SchemeEngine};
pub use utils::error::{Result, SchemeError};
