use crate::core::ConfigProvider;
use crate::domain::model::{OrderLine, RescaleBase, SchemeScope};
use crate::utils::error::{Result, SchemeError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub batch: BatchInfo,
    pub master_data: MasterDataConfig,
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterDataConfig {
    pub path: String,
    /// YYYY-MM-DD，未設定時使用今天
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEntry {
    pub line_id: String,
    pub product_code: String,
    pub customer_code: Option<String>,
    pub division: Option<String>,
    pub order_qty: i64,
    /// 自動套用建議數量（升到下一個門檻）
    pub apply_upsell: Option<bool>,
    /// Base ratio captured when the line was first loaded.
    pub base_order_qty: Option<i64>,
    pub base_free_qty: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub filename: Option<String>,
}

pub const VALID_FORMATS: [&str; 2] = ["csv", "json"];

impl OrderEntry {
    pub fn scope(&self) -> Result<SchemeScope> {
        match (&self.customer_code, &self.division) {
            (Some(customer), None) => Ok(SchemeScope::for_customer(&self.product_code, customer)),
            (None, Some(division)) => Ok(SchemeScope::for_division(&self.product_code, division)),
            _ => Err(SchemeError::ConfigValidationError {
                field: format!("orders[{}]", self.line_id),
                message: "exactly one of customer_code or division is required".to_string(),
            }),
        }
    }

    pub fn to_order_line(&self) -> Result<OrderLine> {
        let mut line = OrderLine::new(&self.line_id, self.scope()?, self.order_qty);
        if let (Some(base_order_qty), Some(base_free_qty)) = (self.base_order_qty, self.base_free_qty) {
            line.base = Some(RescaleBase {
                base_order_qty,
                base_free_qty,
            });
        }
        Ok(line)
    }

    pub fn wants_upsell(&self) -> bool {
        self.apply_upsell.unwrap_or(false)
    }
}

impl BatchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SchemeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MASTER_DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SchemeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_filename(&self) -> &str {
        self.output.filename.as_deref().unwrap_or("orders")
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("batch.name", &self.batch.name)?;
        validation::validate_path("master_data.path", &self.master_data.path)?;
        validation::validate_file_extension("master_data.path", &self.master_data.path, &["csv"])?;
        validation::validate_path("output.path", &self.output.path)?;

        if self.output.formats.is_empty() {
            return Err(SchemeError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }
        for format in &self.output.formats {
            if !VALID_FORMATS.contains(&format.as_str()) {
                return Err(SchemeError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_FORMATS.join(", ")
                    ),
                });
            }
        }

        for entry in &self.orders {
            validation::validate_non_empty_string("orders.line_id", &entry.line_id)?;
            validation::validate_non_empty_string("orders.product_code", &entry.product_code)?;
            validation::validate_order_qty("orders.order_qty", entry.order_qty)?;
            entry.scope()?;
        }

        Ok(())
    }
}

impl ConfigProvider for BatchConfig {
    fn master_data_path(&self) -> &str {
        &self.master_data.path
    }

    fn as_of(&self) -> Option<NaiveDate> {
        self.master_data.as_of
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
