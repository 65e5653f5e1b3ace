use crate::core::Pipeline;
use crate::domain::model::ConversionReport;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub output_path: String,
    pub report: ConversionReport,
}

pub struct ConversionEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ConversionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order; nothing is written unless
    /// every row made it through the transform.
    pub async fn run(&self) -> Result<ConversionOutcome> {
        tracing::info!("Starting conversion");

        let table = self.pipeline.extract().await?;
        tracing::info!("Read {} data rows", table.rows.len());

        let result = self.pipeline.transform(table).await?;
        let report = result.report;
        tracing::info!(
            "Built {} placemarks from {} rows ({} skipped, {} longitudes corrected)",
            report.placemarks,
            report.rows_converted,
            report.rows_skipped,
            report.longitude_corrections
        );

        let output_path = self.pipeline.load(result.document).await?;

        Ok(ConversionOutcome {
            output_path,
            report,
        })
    }
}
