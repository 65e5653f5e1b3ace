use crate::core::builder::placemarks_for_row;
use crate::core::columns::ColumnMap;
use crate::core::kml::{pack_kmz, render_kml};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    ConversionReport, KmlDocument, OutputFormat, RowErrorPolicy, TargetRow, TargetTable,
    TransformResult,
};
use crate::utils::error::{EtlError, Result};

pub struct KmlPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> KmlPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

/// UTF-8 where possible; anything else is taken as Latin-1, one byte per char.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Splits raw CSV bytes into a header row and data rows.
pub fn parse_table(data: &[u8]) -> Result<TargetTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(data);

    let mut records = reader.byte_records().enumerate();

    let headers = match records.next() {
        Some((_, record)) => record?.iter().map(decode_field).collect(),
        None => return Err(EtlError::EmptyInput),
    };

    let mut rows = Vec::new();
    for (index, record) in records {
        let record = record?;
        rows.push(TargetRow {
            line: index + 1,
            fields: record.iter().map(decode_field).collect(),
        });
    }

    Ok(TargetTable { headers, rows })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for KmlPipeline<S, C> {
    async fn extract(&self) -> Result<TargetTable> {
        let input = self.config.input_path();
        tracing::debug!("Reading targets from {}", input.display());

        let data = self.storage.read_file(input).await?;
        let table = parse_table(&data)?;

        tracing::debug!(
            "Found {} columns and {} data rows",
            table.headers.len(),
            table.rows.len()
        );
        Ok(table)
    }

    async fn transform(&self, table: TargetTable) -> Result<TransformResult> {
        let columns = ColumnMap::resolve(table.headers.as_slice(), &self.config.header_rules())?;
        tracing::debug!("Resolved columns: {:?}", columns);

        let policy = self.config.coordinate_policy();
        let on_error = self.config.row_error_policy();

        let mut document = KmlDocument::default();
        let mut report = ConversionReport::default();

        for row in &table.rows {
            let produced = match placemarks_for_row(row, &columns, &policy) {
                Ok(produced) => produced,
                Err(invalid) => {
                    let error = EtlError::CoordinateError {
                        line: row.line,
                        value: invalid.value,
                        reason: invalid.source.to_string(),
                    };
                    match on_error {
                        RowErrorPolicy::Abort => return Err(error),
                        RowErrorPolicy::Skip => {
                            tracing::warn!(line = row.line, "Skipping row: {}", error);
                            report.rows_skipped += 1;
                            continue;
                        }
                    }
                }
            };

            report.rows_converted += 1;
            report.longitude_corrections += produced.longitude_corrections;
            for placemark in produced.placemarks {
                document.push(placemark);
            }
        }

        report.placemarks = document.len();
        Ok(TransformResult { document, report })
    }

    async fn load(&self, document: KmlDocument) -> Result<String> {
        let output_path = self.config.output_path();
        let format = self.config.output_format();

        let kml = render_kml(&document)?;
        let data = match format {
            OutputFormat::Kml => kml,
            OutputFormat::Kmz => pack_kmz(&kml)?,
        };

        tracing::info!(
            path = %output_path.display(),
            "Writing {} to {}",
            format.extension().to_uppercase(),
            output_path.display()
        );
        self.storage.write_file(&output_path, &data).await?;

        tracing::debug!("Wrote {} bytes", data.len());
        Ok(output_path.display().to_string())
    }
}
