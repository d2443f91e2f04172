use crate::domain::model::{Party, SchemeRecord, SchemeScope, SchemeTier};
use crate::domain::ports::{ConfigProvider, SlabStore};
use crate::utils::error::{Result, SchemeError};
use crate::utils::validation;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Master data held in memory, typically loaded from a CSV export of the scheme tables.
///
/// Only records whose validity window covers `as_of` are returned; without an explicit
/// date the current local date is used.
#[derive(Debug, Clone, Default)]
pub struct InMemorySlabStore {
    records: HashMap<SchemeScope, Vec<SchemeRecord>>,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct MasterDataRow {
    product_code: String,
    customer_code: Option<String>,
    division: Option<String>,
    scheme_id: String,
    scheme_name: String,
    min_qty: i64,
    free_qty: i64,
    percent: f64,
    valid_from: Option<String>,
    valid_to: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(row_number: usize, field: &str, value: Option<String>) -> Result<Option<NaiveDate>> {
    non_blank(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| SchemeError::MasterDataError {
                message: format!("row {}: invalid {} '{}': {}", row_number, field, raw, e),
            })
        })
        .transpose()
}

impl MasterDataRow {
    fn into_record(self, row_number: usize) -> Result<SchemeRecord> {
        let party = match (non_blank(self.customer_code), non_blank(self.division)) {
            (Some(customer), None) => Party::Customer(customer),
            (None, Some(division)) => Party::Division(division),
            (Some(_), Some(_)) => {
                return Err(SchemeError::MasterDataError {
                    message: format!("row {}: both customer_code and division are set", row_number),
                })
            }
            (None, None) => {
                return Err(SchemeError::MasterDataError {
                    message: format!("row {}: neither customer_code nor division is set", row_number),
                })
            }
        };

        validation::validate_range(
            &format!("percent (row {})", row_number),
            self.percent,
            0.0,
            100.0,
        )?;

        let valid_from = parse_date(row_number, "valid_from", self.valid_from)?;
        let valid_to = parse_date(row_number, "valid_to", self.valid_to)?;
        if let (Some(from), Some(to)) = (valid_from, valid_to) {
            if from > to {
                return Err(SchemeError::MasterDataError {
                    message: format!("row {}: valid_from {} is after valid_to {}", row_number, from, to),
                });
            }
        }

        Ok(SchemeRecord {
            scope: SchemeScope {
                product_code: self.product_code.trim().to_string(),
                party,
            },
            tier: SchemeTier::new(self.min_qty, self.free_qty, self.percent)
                .with_scheme(self.scheme_id, self.scheme_name),
            valid_from,
            valid_to,
        })
    }
}

impl InMemorySlabStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    pub fn insert(&mut self, scope: SchemeScope, tier: SchemeTier) {
        self.insert_record(SchemeRecord {
            scope,
            tier,
            valid_from: None,
            valid_to: None,
        });
    }

    pub fn insert_record(&mut self, record: SchemeRecord) {
        self.records
            .entry(record.scope.clone())
            .or_default()
            .push(record);
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// 從 CSV 載入主檔資料
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut store = Self::new();
        for (index, row) in csv_reader.deserialize::<MasterDataRow>().enumerate() {
            // 第 1 行是標題
            let record = row?.into_record(index + 2)?;
            store.insert_record(record);
        }

        tracing::info!(
            "Loaded {} scheme tiers across {} scopes",
            store.record_count(),
            store.records.len()
        );
        Ok(store)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(&path)?;
        tracing::debug!("Reading master data from {}", path.as_ref().display());
        Self::from_csv_reader(file)
    }

    /// Loads the CSV named by the configuration and pins its `as_of` date.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let store = Self::from_csv_path(config.master_data_path())?;
        Ok(match config.as_of() {
            Some(date) => store.with_as_of(date),
            None => store,
        })
    }

    fn effective_date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[async_trait]
impl SlabStore for InMemorySlabStore {
    async fn declared_tiers(&self, scope: &SchemeScope) -> Result<Vec<SchemeTier>> {
        let date = self.effective_date();
        let tiers: Vec<SchemeTier> = self
            .records
            .get(scope)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.is_active_on(date))
                    .map(|record| record.tier.clone())
                    .collect()
            })
            .unwrap_or_default();

        if tiers.is_empty() {
            tracing::debug!("No active scheme for {} on {}", scope, date);
        }
        Ok(tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_DATA: &str = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,,S1,Buy 100 get 20,100,20,20,,
P100,C001,,S1,Buy 100 get 20,250,60,24,,
P100,,PHARMA,S2,Division 10+1,10,1,10,2026-01-01,2026-06-30
P200,C001,,S3,Expired,50,5,10,2025-01-01,2025-12-31
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_load_from_csv_and_lookup() {
        let store = InMemorySlabStore::from_csv_reader(MASTER_DATA.as_bytes())
            .unwrap()
            .with_as_of(date(2026, 3, 1));
        assert_eq!(store.record_count(), 4);

        let tiers = store
            .declared_tiers(&SchemeScope::for_customer("P100", "C001"))
            .await
            .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].min_qty, 250);
        assert_eq!(tiers[1].scheme_name, "Buy 100 get 20");

        let division = store
            .declared_tiers(&SchemeScope::for_division("P100", "PHARMA"))
            .await
            .unwrap();
        assert_eq!(division.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_records_are_hidden() {
        let store = InMemorySlabStore::from_csv_reader(MASTER_DATA.as_bytes())
            .unwrap()
            .with_as_of(date(2026, 7, 1));

        let expired = store
            .declared_tiers(&SchemeScope::for_customer("P200", "C001"))
            .await
            .unwrap();
        assert!(expired.is_empty());

        let division = store
            .declared_tiers(&SchemeScope::for_division("P100", "PHARMA"))
            .await
            .unwrap();
        assert!(division.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_scope_is_empty_not_error() {
        let store = InMemorySlabStore::new().with_as_of(date(2026, 1, 1));
        let tiers = store
            .declared_tiers(&SchemeScope::for_customer("NOPE", "C999"))
            .await
            .unwrap();
        assert!(tiers.is_empty());
    }

    #[test]
    fn test_row_with_both_parties_is_rejected() {
        let csv = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,PHARMA,S1,Bad,100,20,20,,
";
        let err = InMemorySlabStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemeError::MasterDataError { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_percent_outside_range_is_rejected() {
        let csv = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,,S1,Bad,100,20,120,,
";
        let err = InMemorySlabStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemeError::InvalidConfigValueError { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let csv = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,,S1,Bad,100,20,20,01/02/2026,
";
        let err = InMemorySlabStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("valid_from"));
    }

    #[test]
    fn test_non_numeric_quantity_is_csv_error() {
        let csv = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,,S1,Bad,lots,20,20,,
";
        let err = InMemorySlabStore::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemeError::CsvError(_)));
    }
}
