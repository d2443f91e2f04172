use crate::adapters::export;
use crate::config::toml_config::BatchConfig;
use crate::core::engine::SchemeEngine;
use crate::domain::model::{OrderLine, SchemeEvaluation, SchemeStatus};
use crate::domain::ports::SlabStore;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub lines: Vec<OrderLine>,
    pub outputs: Vec<PathBuf>,
    pub applied: usize,
    pub below_minimum: usize,
    pub no_scheme: usize,
    pub upsells_applied: usize,
}

/// Commits every configured order line through the engine and writes the export files.
pub struct BatchRunner<S: SlabStore> {
    engine: SchemeEngine<S>,
    config: BatchConfig,
}

impl<S: SlabStore> BatchRunner<S> {
    pub fn new(store: S, config: BatchConfig) -> Self {
        Self {
            engine: SchemeEngine::new(store),
            config,
        }
    }

    pub async fn run(&self) -> Result<BatchReport> {
        tracing::info!("Starting batch '{}'", self.config.batch.name);

        // Extract
        let mut lines = self
            .config
            .orders
            .iter()
            .map(|entry| entry.to_order_line())
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("Loaded {} order lines", lines.len());

        // 需要升級的行先預覽，再套用建議數量
        let mut upsells_applied = 0;
        for (entry, line) in self.config.orders.iter().zip(lines.iter_mut()) {
            if !entry.wants_upsell() {
                continue;
            }
            let preview = self.engine.preview_line(line).await?;
            if let Some(next) = preview.upsell.next_tier {
                tracing::debug!(
                    "Line {}: raising {} to {} for {} free",
                    line.line_id,
                    line.order_qty,
                    next.min_qty,
                    next.free_qty
                );
                line.apply_suggested_qty(next.min_qty);
                upsells_applied += 1;
            }
        }

        // Transform
        let evaluations = self.engine.commit_lines(&mut lines).await?;

        // Load
        let outputs = self.write_outputs(&lines)?;

        let report = Self::summarize(lines, outputs, &evaluations, upsells_applied);
        tracing::info!(
            "Batch '{}' done: {} applied, {} below minimum, {} without scheme",
            self.config.batch.name,
            report.applied,
            report.below_minimum,
            report.no_scheme
        );
        Ok(report)
    }

    fn write_outputs(&self, lines: &[OrderLine]) -> Result<Vec<PathBuf>> {
        let dir = Path::new(&self.config.output.path);
        std::fs::create_dir_all(dir)?;

        let mut outputs = Vec::new();
        for format in &self.config.output.formats {
            let path = dir.join(format!("{}.{}", self.config.output_filename(), format));
            let file = std::fs::File::create(&path)?;
            match format.as_str() {
                "json" => export::write_order_lines_json(file, lines)?,
                _ => export::write_order_lines_csv(file, lines)?,
            }
            tracing::info!("Wrote {}", path.display());
            outputs.push(path);
        }
        Ok(outputs)
    }

    fn summarize(
        lines: Vec<OrderLine>,
        outputs: Vec<PathBuf>,
        evaluations: &[SchemeEvaluation],
        upsells_applied: usize,
    ) -> BatchReport {
        let mut report = BatchReport {
            lines,
            outputs,
            upsells_applied,
            ..BatchReport::default()
        };
        for evaluation in evaluations {
            match evaluation.status {
                SchemeStatus::Applied => report.applied += 1,
                SchemeStatus::BelowMinimum { .. } => report.below_minimum += 1,
                SchemeStatus::NoScheme => report.no_scheme += 1,
            }
        }
        report
    }
}
