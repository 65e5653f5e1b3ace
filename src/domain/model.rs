use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical field a CSV column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Identifier,
    State,
    Description,
    Instructions,
    StartLongitude,
    StartLatitude,
    StopLongitude,
    StopLatitude,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 8] = [
        ColumnRole::Identifier,
        ColumnRole::State,
        ColumnRole::Description,
        ColumnRole::Instructions,
        ColumnRole::StartLongitude,
        ColumnRole::StartLatitude,
        ColumnRole::StopLongitude,
        ColumnRole::StopLatitude,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Identifier => "identifier",
            ColumnRole::State => "state",
            ColumnRole::Description => "description",
            ColumnRole::Instructions => "special instructions",
            ColumnRole::StartLongitude => "start longitude",
            ColumnRole::StartLatitude => "start latitude",
            ColumnRole::StopLongitude => "stop longitude",
            ColumnRole::StopLatitude => "stop latitude",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ColumnRole::StopLongitude | ColumnRole::StopLatitude)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One CSV data row. `line` is the 1-based record number, the header being 1.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl TargetRow {
    /// Cells past the end of a short record read as empty.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetTable {
    pub headers: Vec<String>,
    pub rows: Vec<TargetRow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

/// Shortest round-trip plain decimal; whole numbers keep one fractional
/// digit ("40.0") and tiny values never switch to exponent form.
fn decimal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        text + ".0"
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", decimal(self.lon), decimal(self.lat))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub description: String,
    pub coordinates: Coordinates,
}

/// Placemarks under a single folder, in output order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlDocument {
    pub placemarks: Vec<Placemark>,
}

impl KmlDocument {
    pub fn push(&mut self, placemark: Placemark) {
        self.placemarks.push(placemark);
    }

    pub fn len(&self) -> usize {
        self.placemarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placemarks.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub rows_converted: usize,
    pub rows_skipped: usize,
    pub longitude_corrections: usize,
    pub placemarks: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub document: KmlDocument,
    pub report: ConversionReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Kml,
    Kmz,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Kml => "kml",
            OutputFormat::Kmz => "kmz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    #[default]
    Abort,
    Skip,
}
