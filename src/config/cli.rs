use crate::core::ConfigProvider;
use crate::domain::model::SchemeScope;
use crate::utils::error::{Result, SchemeError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "scheme-calc")]
#[command(about = "Evaluate an order quantity against a product's free-goods scheme")]
pub struct CliConfig {
    #[arg(long, default_value = "./schemes.csv", help = "Scheme master data (CSV)")]
    pub master_data: String,

    #[arg(long)]
    pub product: String,

    #[arg(long, conflicts_with = "division")]
    pub customer: Option<String>,

    #[arg(long)]
    pub division: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub qty: i64,

    #[arg(long, help = "Evaluate schemes active on this date (YYYY-MM-DD)")]
    pub as_of: Option<NaiveDate>,

    #[arg(long, help = "Print the evaluation as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn scope(&self) -> Result<SchemeScope> {
        match (&self.customer, &self.division) {
            (Some(customer), None) => Ok(SchemeScope::for_customer(&self.product, customer)),
            (None, Some(division)) => Ok(SchemeScope::for_division(&self.product, division)),
            _ => Err(SchemeError::ConfigValidationError {
                field: "customer/division".to_string(),
                message: "exactly one of --customer or --division is required".to_string(),
            }),
        }
    }
}

impl ConfigProvider for CliConfig {
    fn master_data_path(&self) -> &str {
        &self.master_data
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("master_data", &self.master_data)?;
        validation::validate_file_extension("master_data", &self.master_data, &["csv"])?;
        validation::validate_non_empty_string("product", &self.product)?;
        validation::validate_order_qty("qty", self.qty)?;
        self.scope().map(|_| ())
    }
}
