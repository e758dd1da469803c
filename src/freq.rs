//! Frequency-string parsing (spec.md §6), an external collaborator
//! whose interface — not its lexer internals — is part of the core
//! contract: [`AnnotationTable`](crate::annotation::AnnotationTable)
//! only needs a `&str -> f64` conversion.
//!
//! Recognised forms: `"N%"`, `"N.M%"`, `"N/M"`, `"N of M"`, and the
//! named buckets below. Anything else defaults to `1.0` with a logged
//! diagnostic, per spec.md §6.
const VERY_RARE: f64 = 0.02;
const OCCASIONAL: f64 = 0.1;
const FREQUENT: f64 = 0.5;
const VERY_FREQUENT: f64 = 0.9;
const OBLIGATE: f64 = 1.0;

/// Parses a frequency string into a probability in `(0, 1]`.
///
/// Unparseable input defaults to `1.0` and logs a warning rather than
/// failing — frequency parsing never aborts annotation loading.
pub fn parse_frequency(raw: &str) -> f64 {
    let s = raw.trim();

    match s.to_lowercase().as_str() {
        "very rare" => return VERY_RARE,
        "occasional" => return OCCASIONAL,
        "frequent" => return FREQUENT,
        "very frequent" => return VERY_FREQUENT,
        "obligate" => return OBLIGATE,
        _ => {}
    }

    if let Some(pct) = s.strip_suffix('%') {
        if let Ok(value) = pct.trim().parse::<f64>() {
            return (value / 100.0).clamp(0.0, 1.0);
        }
    }

    if let Some((num, den)) = s.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            if d != 0.0 {
                return (n / d).clamp(0.0, 1.0);
            }
        }
    }

    if let Some((num, den)) = s.split_once(" of ") {
        if let (Ok(n), Ok(d)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            if d != 0.0 {
                return (n / d).clamp(0.0, 1.0);
            }
        }
    }

    log::warn!("unrecognised frequency string '{raw}', defaulting to 1.0");
    1.0
}
