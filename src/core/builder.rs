use crate::core::columns::ColumnMap;
use crate::core::coordinates::{normalize, scrub, CoordinatePolicy, InvalidCoordinate};
use crate::core::naming::{canonical_name, start_name, stop_name};
use crate::domain::model::{ColumnRole, Placemark, TargetRow};

/// Placemarks produced by one row, plus how many longitudes were sign-corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlacemarks {
    pub placemarks: Vec<Placemark>,
    pub longitude_corrections: usize,
}

pub fn describe(description: &str, instructions: &str) -> String {
    if instructions.trim().is_empty() {
        description.to_string()
    } else {
        format!("{}\n{}", description, instructions)
    }
}

pub fn is_blank(raw: &str) -> bool {
    scrub(raw).is_empty()
}

/// Turns a data row into one placemark (single waypoint) or a START/STOP pair.
pub fn placemarks_for_row(
    row: &TargetRow,
    columns: &ColumnMap,
    policy: &CoordinatePolicy,
) -> Result<RowPlacemarks, InvalidCoordinate> {
    let field = |role: ColumnRole| columns.get(row, role);

    let name = canonical_name(field(ColumnRole::Identifier), field(ColumnRole::State));
    let description = describe(field(ColumnRole::Description), field(ColumnRole::Instructions));

    let waypoints = if is_blank(field(ColumnRole::StopLongitude)) {
        vec![(ColumnRole::StartLongitude, ColumnRole::StartLatitude, name)]
    } else {
        vec![
            (
                ColumnRole::StartLongitude,
                ColumnRole::StartLatitude,
                start_name(&name),
            ),
            (
                ColumnRole::StopLongitude,
                ColumnRole::StopLatitude,
                stop_name(&name),
            ),
        ]
    };

    let mut out = RowPlacemarks {
        placemarks: Vec::with_capacity(waypoints.len()),
        longitude_corrections: 0,
    };

    for (lon_role, lat_role, name) in waypoints {
        let lon_raw = field(lon_role);
        let normalized = normalize(lon_raw, field(lat_role), policy)?;
        if normalized.longitude_corrected {
            tracing::warn!(
                line = row.line,
                value = lon_raw.trim(),
                "Row {}: fixing lon {} -> {}",
                row.line,
                lon_raw.trim(),
                normalized.coordinates.lon
            );
            out.longitude_corrections += 1;
        }
        out.placemarks.push(Placemark {
            name,
            description: description.clone(),
            coordinates: normalized.coordinates,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::columns::default_rules;

    fn columns() -> ColumnMap {
        let headers = [
            "id",
            "state",
            "description",
            "special instructions",
            "start longitude",
            "start latitude",
            "stop longitude",
            "stop latitude",
        ];
        ColumnMap::resolve(&headers[..], &default_rules()).unwrap()
    }

    fn row(fields: &[&str]) -> TargetRow {
        TargetRow {
            line: 2,
            fields: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_blank_stop_yields_single_placemark() {
        let policy = CoordinatePolicy::default();
        for stop in ["", " ", "\u{c2}\u{a0}", "\u{a0}  "] {
            let r = row(&["T1", "OH", "Bridge", "", "-85.5", "40.0", stop, ""]);
            let out = placemarks_for_row(&r, &columns(), &policy).unwrap();
            assert_eq!(out.placemarks.len(), 1, "stop field {:?}", stop);
            assert_eq!(out.placemarks[0].name, "OH_T1");
            assert_eq!(out.placemarks[0].coordinates.to_string(), "-85.5,40.0");
        }
    }

    #[test]
    fn test_stop_yields_start_then_stop() {
        let r = row(&["AB_12_x", "OH", "Road", "Fly low", "-85.5", "40.0", "-85.6", "40.1"]);
        let out = placemarks_for_row(&r, &columns(), &CoordinatePolicy::default()).unwrap();
        let names: Vec<&str> = out.placemarks.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["AB_12_START", "AB_12_STOP"]);
        assert_eq!(out.placemarks[1].coordinates.to_string(), "-85.6,40.1");
        assert!(out.placemarks.iter().all(|p| p.description == "Road\nFly low"));
    }

    #[test]
    fn test_corrections_counted() {
        let r = row(&["T1", "OH", "", "", "85.5", "40.0", "85.6", "40.1"]);
        let out = placemarks_for_row(&r, &columns(), &CoordinatePolicy::default()).unwrap();
        assert_eq!(out.longitude_corrections, 2);
        assert_eq!(out.placemarks[0].coordinates.lon, -85.5);
    }

    #[test]
    fn test_blank_instructions_not_appended() {
        assert_eq!(describe("Bridge", "  "), "Bridge");
        assert_eq!(describe("Bridge", "North side"), "Bridge\nNorth side");
    }

    #[test]
    fn test_bad_stop_coordinate_fails_row() {
        let r = row(&["T1", "OH", "", "", "-85.5", "40.0", "garbage", "40.1"]);
        let err = placemarks_for_row(&r, &columns(), &CoordinatePolicy::default()).unwrap_err();
        assert_eq!(err.value, "garbage");
    }
}
