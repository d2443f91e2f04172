use crate::domain::model::OrderLine;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;

/// One row of the order export, flattened for spreadsheet use.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExportRow {
    pub line_id: String,
    pub product_code: String,
    pub party: String,
    pub order_qty: i64,
    pub free_qty: i64,
    pub scheme_percent: f64,
    pub qty_plus_free: String,
    /// 有贈品的行需標示
    pub highlight: bool,
}

impl From<&OrderLine> for ExportRow {
    fn from(line: &OrderLine) -> Self {
        Self {
            line_id: line.line_id.clone(),
            product_code: line.scope.product_code.clone(),
            party: line.scope.party.to_string(),
            order_qty: line.order_qty,
            free_qty: line.free_qty,
            scheme_percent: line.scheme_percent,
            qty_plus_free: line.qty_plus_free(),
            highlight: line.is_scheme_eligible(),
        }
    }
}

pub fn write_order_lines_csv<W: Write>(writer: W, lines: &[OrderLine]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for line in lines {
        csv_writer.serialize(ExportRow::from(line))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_order_lines_json<W: Write>(writer: W, lines: &[OrderLine]) -> Result<()> {
    let rows: Vec<ExportRow> = lines.iter().map(ExportRow::from).collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
