//! Header row resolution.
//!
//! Headers are matched against an ordered rule table; the first rule whose
//! predicate accepts the lower-cased header decides the column's role.

use crate::domain::model::{ColumnRole, TargetRow};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMatch {
    Prefix(String),
    Exact(String),
}

impl HeaderMatch {
    fn accepts(&self, header: &str) -> bool {
        match self {
            HeaderMatch::Prefix(prefix) => header.starts_with(prefix.as_str()),
            HeaderMatch::Exact(label) => header == label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    pub matcher: HeaderMatch,
    pub role: ColumnRole,
}

impl HeaderRule {
    pub fn prefix(prefix: &str, role: ColumnRole) -> Self {
        Self {
            matcher: HeaderMatch::Prefix(prefix.to_lowercase()),
            role,
        }
    }

    pub fn exact(label: &str, role: ColumnRole) -> Self {
        Self {
            matcher: HeaderMatch::Exact(label.trim().to_lowercase()),
            role,
        }
    }
}

/// Built-in header variants, in priority order.
pub fn default_rules() -> Vec<HeaderRule> {
    vec![
        HeaderRule::prefix("task", ColumnRole::Identifier),
        HeaderRule::prefix("id", ColumnRole::Identifier),
        HeaderRule::exact("imagery id", ColumnRole::Identifier),
        HeaderRule::exact("state", ColumnRole::State),
        HeaderRule::exact("description", ColumnRole::Description),
        HeaderRule::exact("special instructions", ColumnRole::Instructions),
        HeaderRule::exact("start longitude", ColumnRole::StartLongitude),
        HeaderRule::exact("start latitude", ColumnRole::StartLatitude),
        HeaderRule::exact("stop longitude", ColumnRole::StopLongitude),
        HeaderRule::exact("stop latitude", ColumnRole::StopLatitude),
    ]
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Resolved role -> column index mapping. Only constructed through
/// [`ColumnMap::resolve`], so every required role is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    identifier: usize,
    state: usize,
    description: usize,
    instructions: usize,
    start_longitude: usize,
    start_latitude: usize,
    stop_longitude: Option<usize>,
    stop_latitude: Option<usize>,
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(headers: &[S], rules: &[HeaderRule]) -> Result<Self> {
        let mut found: HashMap<ColumnRole, usize> = HashMap::new();

        for (index, raw) in headers.iter().enumerate() {
            let header = normalize_header(raw.as_ref());
            let Some(rule) = rules.iter().find(|rule| rule.matcher.accepts(&header)) else {
                tracing::debug!("Ignoring column {} ('{}')", index + 1, raw.as_ref());
                continue;
            };

            if let Some(previous) = found.insert(rule.role, index) {
                tracing::warn!(
                    "Columns {} and {} both map to '{}'; using column {}",
                    previous + 1,
                    index + 1,
                    rule.role,
                    index + 1
                );
            }
        }

        let required = |role: ColumnRole| {
            found
                .get(&role)
                .copied()
                .ok_or(EtlError::MissingColumn { role })
        };

        let map = Self {
            identifier: required(ColumnRole::Identifier)?,
            state: required(ColumnRole::State)?,
            description: required(ColumnRole::Description)?,
            instructions: required(ColumnRole::Instructions)?,
            start_longitude: required(ColumnRole::StartLongitude)?,
            start_latitude: required(ColumnRole::StartLatitude)?,
            stop_longitude: found.get(&ColumnRole::StopLongitude).copied(),
            stop_latitude: found.get(&ColumnRole::StopLatitude).copied(),
        };

        // Stop columns come as a pair or not at all.
        match (map.stop_longitude, map.stop_latitude) {
            (Some(_), None) => Err(EtlError::MissingColumn {
                role: ColumnRole::StopLatitude,
            }),
            (None, Some(_)) => Err(EtlError::MissingColumn {
                role: ColumnRole::StopLongitude,
            }),
            _ => Ok(map),
        }
    }

    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Identifier => Some(self.identifier),
            ColumnRole::State => Some(self.state),
            ColumnRole::Description => Some(self.description),
            ColumnRole::Instructions => Some(self.instructions),
            ColumnRole::StartLongitude => Some(self.start_longitude),
            ColumnRole::StartLatitude => Some(self.start_latitude),
            ColumnRole::StopLongitude => self.stop_longitude,
            ColumnRole::StopLatitude => self.stop_latitude,
        }
    }

    /// Field for `role` in `row`; absent optional columns read as blank.
    pub fn get<'r>(&self, row: &'r TargetRow, role: ColumnRole) -> &'r str {
        self.index(role).map(|i| row.field(i)).unwrap_or("")
    }
}
