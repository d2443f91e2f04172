use anyhow::Result;
use scheme_calc::{BatchConfig, BatchRunner, InMemorySlabStore};
use tempfile::TempDir;

const MASTER_DATA: &str = "\
product_code,customer_code,division,scheme_id,scheme_name,min_qty,free_qty,percent,valid_from,valid_to
P100,C001,,S1,Buy 100 get 20,100,20,20,,
P100,C001,,S1,Buy 100 get 20,250,60,24,,
P200,,PHARMA,S2,10+1,10,1,10,2026-01-01,2026-12-31
P300,,PHARMA,S3,Old promo,5,1,20,2024-01-01,2024-12-31
";

fn batch_config(dir: &str) -> String {
    format!(
        r#"
[batch]
name = "integration"
version = "1.0.0"

[master_data]
path = "{dir}/schemes.csv"
as_of = "2026-10-16"

[[orders]]
line_id = "L1"
product_code = "P100"
customer_code = "C001"
order_qty = 250

[[orders]]
line_id = "L2"
product_code = "P200"
division = "PHARMA"
order_qty = 8
apply_upsell = true

[[orders]]
line_id = "L3"
product_code = "P300"
division = "PHARMA"
order_qty = 50

[[orders]]
line_id = "L4"
product_code = "P100"
customer_code = "C001"
order_qty = 40

[output]
path = "{dir}/out"
formats = ["csv", "json"]
filename = "march"
"#
    )
}

#[tokio::test]
async fn test_batch_commits_lines_and_writes_exports() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().to_str().unwrap().replace('\\', "/");
    std::fs::write(format!("{}/schemes.csv", dir), MASTER_DATA)?;

    let config = BatchConfig::from_toml_str(&batch_config(&dir))?;
    let store = InMemorySlabStore::from_config(&config)?;
    let report = BatchRunner::new(store, config).run().await?;

    assert_eq!(report.applied, 2);
    assert_eq!(report.below_minimum, 1);
    assert_eq!(report.no_scheme, 1);
    assert_eq!(report.upsells_applied, 1);

    let l1 = &report.lines[0];
    assert_eq!((l1.order_qty, l1.free_qty), (250, 60));
    assert_eq!(l1.scheme_percent, 24.0);

    // 8 was raised to the first tier and still remembers the typed quantity
    let l2 = &report.lines[1];
    assert_eq!((l2.manual_qty, l2.order_qty, l2.free_qty), (8, 10, 1));
    assert!(l2.scheme_applied);

    let l3 = &report.lines[2];
    assert_eq!(l3.free_qty, 0);
    assert!(l3.base.is_none());

    let l4 = &report.lines[3];
    assert_eq!(l4.free_qty, 0);
    assert!(l4.base.is_some());

    assert_eq!(report.outputs.len(), 2);
    let csv = std::fs::read_to_string(format!("{}/out/march.csv", dir))?;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], "L1,P100,customer:C001,250,60,24.0,250+60,true");
    assert_eq!(rows[2], "L2,P200,division:PHARMA,10,1,10.0,10+1,true");
    assert_eq!(rows[3], "L3,P300,division:PHARMA,50,0,0.0,50,false");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(format!("{}/out/march.json", dir))?)?;
    assert_eq!(json.as_array().map(Vec::len), Some(4));
    assert_eq!(json[3]["highlight"], false);

    Ok(())
}

#[tokio::test]
async fn test_missing_master_data_file_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let config = BatchConfig::from_toml_str(&batch_config(&dir))?;
    let err = InMemorySlabStore::from_config(&config).unwrap_err();
    assert!(matches!(err, scheme_calc::SchemeError::IoError(_)));

    Ok(())
}
