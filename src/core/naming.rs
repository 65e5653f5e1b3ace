/// Canonical placemark name for a target.
///
/// Identifiers that already carry a prefix (`AB12_034_extra`) keep their first
/// two underscore-separated parts; bare identifiers are prefixed with the state.
pub fn canonical_name(identifier: &str, state: &str) -> String {
    let mut parts = identifier.split('_');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => format!("{}_{}", first, second),
        _ => format!("{}_{}", state.trim(), identifier),
    }
}

pub fn start_name(canonical: &str) -> String {
    format!("{}_START", canonical)
}

pub fn stop_name(canonical: &str) -> String {
    format!("{}_STOP", canonical)
}
