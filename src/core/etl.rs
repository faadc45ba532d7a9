use crate::core::{Pipeline, RunSummary};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract, transform, then deliver row by row. Extraction problems abort
    /// the run; a failed delivery is logged and the loop moves on.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();

        tracing::info!("📥 Extracting rows...");
        let rows = self.pipeline.extract().await?;
        if rows.is_empty() {
            tracing::error!("❌ Extraction produced no rows, aborting run");
            return Err(EtlError::ProcessingError {
                message: "extraction produced no rows".to_string(),
            });
        }
        let rows_extracted = rows.len();
        tracing::info!("📥 Extracted {} rows", rows_extracted);

        tracing::info!("🔄 Transforming rows...");
        let transformed = self.pipeline.transform(rows).await?;
        let rows_transformed = transformed.len();
        tracing::info!("🔄 Transformed {} rows", rows_transformed);

        tracing::info!("📤 Delivering {} rows...", rows_transformed);
        let mut rows_delivered = 0;
        let mut rows_failed = 0;
        for (index, record) in transformed.iter().enumerate() {
            match self.pipeline.load_row(record).await {
                Ok(response) => {
                    tracing::debug!("Row {}: destination accepted ({})", index, response);
                    rows_delivered += 1;
                }
                Err(e) => {
                    tracing::warn!("Row {}: delivery failed, continuing: {}", index, e);
                    rows_failed += 1;
                }
            }
        }

        let finished_at = Utc::now();
        tracing::info!(
            "📤 Delivered {}/{} rows ({} failed)",
            rows_delivered,
            rows_transformed,
            rows_failed
        );

        Ok(RunSummary {
            rows_extracted,
            rows_transformed,
            rows_delivered,
            rows_failed,
            started_at,
            finished_at,
        })
    }
}
