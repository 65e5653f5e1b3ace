//! Longitude/latitude normalization.
//!
//! Each axis is either a plain decimal number or a degrees-minutes-seconds
//! string in one of the layouts produced by the spreadsheets we ingest:
//!
//! * `40-26-46 N` (packed triple, then hemisphere)
//! * `079°58'56" W` (packed triple with marks, then hemisphere)
//! * `40° 26' 46" N` (four tokens)

use crate::domain::model::Coordinates;
use thiserror::Error;

/// Mojibake left behind when a UTF-8 non-breaking space is read as Latin-1.
const NBSP_ARTIFACT: &str = "\u{c2}\u{a0}";
const NBSP: char = '\u{a0}';
const MARKS: [char; 6] = ['°', '\'', '"', '′', '″', '\u{c2}'];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("expected 0, 2 or 4 space-separated tokens, found {0}")]
    TokenCount(usize),

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("'{0}' is not a degrees-minutes-seconds triple")]
    PackedTriple(String),

    #[error("unknown hemisphere '{0}'")]
    Hemisphere(String),

    #[error("{axis} {value} is outside [-{limit}, {limit}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        limit: f64,
    },
}

/// A raw axis value that failed to decode.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("'{value}': {source}")]
pub struct InvalidCoordinate {
    pub value: String,
    #[source]
    pub source: CoordinateError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn parse(token: &str) -> Result<Self, CoordinateError> {
        match token.to_ascii_uppercase().as_str() {
            "N" => Ok(Hemisphere::North),
            "S" => Ok(Hemisphere::South),
            "E" => Ok(Hemisphere::East),
            "W" => Ok(Hemisphere::West),
            _ => Err(CoordinateError::Hemisphere(token.to_string())),
        }
    }

    fn sign(&self) -> f64 {
        match self {
            Hemisphere::South | Hemisphere::West => -1.0,
            Hemisphere::North | Hemisphere::East => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatePolicy {
    /// Treat positive decimal longitudes as sign-entry mistakes and negate them.
    pub western_hemisphere: bool,
}

impl Default for CoordinatePolicy {
    fn default() -> Self {
        Self {
            western_hemisphere: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub coordinates: Coordinates,
    pub longitude_corrected: bool,
}

/// Replaces non-breaking-space artifacts with plain spaces and trims.
pub fn scrub(raw: &str) -> String {
    raw.replace(NBSP_ARTIFACT, " ")
        .replace(NBSP, " ")
        .trim_matches(' ')
        .to_string()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_component(raw: &str) -> Result<f64, CoordinateError> {
    let cleaned = raw.trim_matches(|c: char| MARKS.contains(&c));
    parse_decimal(cleaned).ok_or_else(|| CoordinateError::NotNumeric(raw.to_string()))
}

fn split_packed(raw: &str) -> Result<[f64; 3], CoordinateError> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == '-' || MARKS.contains(&c))
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [d, m, s] => Ok([parse_component(d)?, parse_component(m)?, parse_component(s)?]),
        _ => Err(CoordinateError::PackedTriple(raw.to_string())),
    }
}

/// Decodes a DMS string into signed decimal degrees.
///
/// `default_hemisphere` only applies to a blank value, which decodes to 0.
pub fn decode_dms(raw: &str, default_hemisphere: Hemisphere) -> Result<f64, CoordinateError> {
    let cleaned = scrub(raw);
    let tokens: Vec<&str> = cleaned.split(' ').filter(|t| !t.is_empty()).collect();

    let ([d, m, s], hemisphere) = match tokens.as_slice() {
        [] => ([0.0, 0.0, 0.0], default_hemisphere),
        [packed, h] => (split_packed(packed)?, Hemisphere::parse(h)?),
        [d, m, s, h] => (
            [parse_component(d)?, parse_component(m)?, parse_component(s)?],
            Hemisphere::parse(h)?,
        ),
        other => return Err(CoordinateError::TokenCount(other.len())),
    };

    let value = d + m / 60.0 + s / 3600.0;
    if value == 0.0 {
        return Ok(0.0);
    }
    Ok(value * hemisphere.sign())
}

fn check_range(axis: &'static str, value: f64, limit: f64) -> Result<f64, CoordinateError> {
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { axis, value, limit });
    }
    Ok(value)
}

fn decode_axis(
    raw: &str,
    default_hemisphere: Hemisphere,
    axis: &'static str,
    limit: f64,
) -> Result<f64, InvalidCoordinate> {
    let invalid = |source| InvalidCoordinate {
        value: raw.to_string(),
        source,
    };
    let value = decode_dms(raw, default_hemisphere).map_err(invalid)?;
    check_range(axis, value, limit).map_err(invalid)
}

/// Converts a raw longitude/latitude pair into decimal degrees.
pub fn normalize(
    lon_raw: &str,
    lat_raw: &str,
    policy: &CoordinatePolicy,
) -> Result<Normalized, InvalidCoordinate> {
    let mut longitude_corrected = false;

    let lon = match parse_decimal(lon_raw) {
        Some(lon) => {
            let lon = if lon > 0.0 && policy.western_hemisphere {
                longitude_corrected = true;
                -lon
            } else {
                lon
            };
            check_range("longitude", lon, 180.0).map_err(|source| InvalidCoordinate {
                value: lon_raw.to_string(),
                source,
            })?
        }
        None => decode_axis(lon_raw, Hemisphere::West, "longitude", 180.0)?,
    };

    let lat = match parse_decimal(lat_raw) {
        Some(lat) => check_range("latitude", lat, 90.0).map_err(|source| InvalidCoordinate {
            value: lat_raw.to_string(),
            source,
        })?,
        None => decode_axis(lat_raw, Hemisphere::North, "latitude", 90.0)?,
    };

    Ok(Normalized {
        coordinates: Coordinates { lon, lat },
        longitude_corrected,
    })
}
