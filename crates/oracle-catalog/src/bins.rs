// crates/oracle-catalog/src/bins.rs
// ============================================================================
// Module: Bin Specification
// Description: Validation and value-to-bin mapping for binned_continuous events.
// Purpose: Map numeric simulation/compiled-intel values onto a catalog's
//          declared bin identifiers, deterministically and without gaps.
// Dependencies: oracle-core, serde
// ============================================================================

//! ## Overview
//! A `binned_continuous` event partitions a numeric domain into named bins.
//! This module validates that partition (no overlaps, no gaps, at least two
//! bins) and maps a resolved numeric value onto the first bin that contains
//! it, in definition order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single bin boundary definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinDef {
    /// Bin identifier; must match one of the event's non-`UNKNOWN` outcomes.
    pub bin_id: String,
    /// Human-readable label.
    pub label: String,
    /// Inclusive/exclusive lower bound; `None` means unbounded below.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive/exclusive upper bound; `None` means unbounded above.
    #[serde(default)]
    pub max: Option<f64>,
    /// Whether `min` itself belongs to this bin. Defaults to `true`.
    #[serde(default = "default_include_min")]
    pub include_min: bool,
    /// Whether `max` itself belongs to this bin. Defaults to `false`.
    #[serde(default)]
    pub include_max: bool,
}

const fn default_include_min() -> bool {
    true
}

/// A full bin specification for a `binned_continuous` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Bins in definition order. Order determines first-match-wins semantics.
    pub bins: Vec<BinDef>,
}

/// Reasons `value_to_bin` can fail to produce a concrete bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinMapError {
    /// The input value was absent.
    MissingValue,
    /// The input value could not be parsed as a finite number.
    InvalidNumericValue,
    /// The value did not fall inside any declared bin.
    OutOfRange,
}

impl BinMapError {
    /// The original system's stable string tag for this failure reason.
    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::MissingValue => "missing_value",
            Self::InvalidNumericValue => "invalid_numeric_value",
            Self::OutOfRange => "out_of_range",
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a bin specification, returning every error found (not just the
/// first), matching the original system's accumulate-then-report behavior.
#[must_use]
pub fn validate_bin_spec(spec: &BinSpec) -> Vec<String> {
    let mut errors = Vec::new();

    if spec.bins.is_empty() {
        errors.push("bin_spec must contain 'bins' array".to_string());
        return errors;
    }

    if spec.bins.len() < 2 {
        errors.push("bin_spec must have at least 2 bins".to_string());
        return errors;
    }

    let mut seen_ids = BTreeSet::new();
    for bin in &spec.bins {
        if !seen_ids.insert(bin.bin_id.as_str()) {
            errors.push(format!("duplicate bin_id: {}", bin.bin_id));
        }
    }

    if bins_have_overlap(spec) {
        errors.push("bins have overlapping ranges".to_string());
    }

    if bins_have_gaps(spec) {
        errors.push("bins have gaps in coverage".to_string());
    }

    errors
}

/// Checks whether any two bins in `spec` could both match the same value.
#[must_use]
pub fn bins_have_overlap(spec: &BinSpec) -> bool {
    if spec.bins.len() < 2 {
        return false;
    }
    for i in 0 .. spec.bins.len() {
        for j in (i + 1) .. spec.bins.len() {
            if ranges_overlap(&spec.bins[i], &spec.bins[j]) {
                return true;
            }
        }
    }
    false
}

fn ranges_overlap(r1: &BinDef, r2: &BinDef) -> bool {
    let r1_min = r1.min.unwrap_or(f64::NEG_INFINITY);
    let r1_max = r1.max.unwrap_or(f64::INFINITY);
    let r2_min = r2.min.unwrap_or(f64::NEG_INFINITY);
    let r2_max = r2.max.unwrap_or(f64::INFINITY);

    if r1_max < r2_min {
        return false;
    }
    if (r1_max - r2_min).abs() < f64::EPSILON && r1_max == r2_min {
        return r1.include_max && r2.include_min;
    }

    if r2_max < r1_min {
        return false;
    }
    if r2_max == r1_min {
        return r2.include_max && r1.include_min;
    }

    true
}

/// Checks whether `spec`'s bins leave any value in the domain uncovered.
#[must_use]
pub fn bins_have_gaps(spec: &BinSpec) -> bool {
    if spec.bins.len() < 2 {
        return false;
    }

    #[derive(Clone, Copy)]
    struct Boundary {
        value: f64,
        is_max: bool,
        inclusive: bool,
    }

    let mut boundaries: Vec<Boundary> = Vec::new();
    for bin in &spec.bins {
        if let Some(min) = bin.min {
            boundaries.push(Boundary {
                value: min,
                is_max: false,
                inclusive: bin.include_min,
            });
        }
        if let Some(max) = bin.max {
            boundaries.push(Boundary {
                value: max,
                is_max: true,
                inclusive: bin.include_max,
            });
        }
    }

    if boundaries.is_empty() {
        return false;
    }

    boundaries.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));

    let mut sorted_values: Vec<f64> = boundaries.iter().map(|b| b.value).collect();
    sorted_values.dedup_by(|a, b| (*a - *b).abs() < f64::EPSILON);

    for (idx, &v) in sorted_values.iter().enumerate() {
        let group: Vec<&Boundary> =
            boundaries.iter().filter(|b| (b.value - v).abs() < f64::EPSILON).collect();
        let has_inclusive_max = group.iter().any(|b| b.is_max && b.inclusive);
        let has_inclusive_min = group.iter().any(|b| !b.is_max && b.inclusive);
        let has_exclusive_max = group.iter().any(|b| b.is_max && !b.inclusive);
        let has_exclusive_min = group.iter().any(|b| !b.is_max && !b.inclusive);

        if has_exclusive_max && has_exclusive_min && !has_inclusive_max && !has_inclusive_min {
            return true;
        }

        if let Some(&next_v) = sorted_values.get(idx + 1) {
            let covered = spec.bins.iter().any(|bin| {
                let effective_min = bin.min.unwrap_or(f64::NEG_INFINITY);
                let effective_max = bin.max.unwrap_or(f64::INFINITY);
                effective_max > v && effective_min < next_v
            });
            if !covered {
                return true;
            }
        }
    }

    false
}

// ============================================================================
// SECTION: Mapping
// ============================================================================

/// Maps a resolved numeric value to a bin identifier.
///
/// Checks bins in definition order; the first bin whose bounds contain
/// `value` wins. Returns [`BinMapError`] when `value` is absent, not
/// numeric, or matches no bin.
pub fn value_to_bin(value: Option<f64>, spec: &BinSpec) -> Result<&str, BinMapError> {
    let value = match value {
        None => return Err(BinMapError::MissingValue),
        Some(v) if v.is_nan() => return Err(BinMapError::InvalidNumericValue),
        Some(v) => v,
    };

    for bin in &spec.bins {
        if let Some(min) = bin.min {
            if bin.include_min {
                if value < min {
                    continue;
                }
            } else if value <= min {
                continue;
            }
        }
        if let Some(max) = bin.max {
            if bin.include_max {
                if value > max {
                    continue;
                }
            } else if value >= max {
                continue;
            }
        }
        return Ok(bin.bin_id.as_str());
    }

    Err(BinMapError::OutOfRange)
}

/// Looks up a bin definition by its identifier.
#[must_use]
pub fn get_bin_by_id<'a>(spec: &'a BinSpec, bin_id: &str) -> Option<&'a BinDef> {
    spec.bins.iter().find(|b| b.bin_id == bin_id)
}

/// Returns all bin identifiers in definition order.
#[must_use]
pub fn get_bin_ids(spec: &BinSpec) -> Vec<&str> {
    spec.bins.iter().map(|b| b.bin_id.as_str()).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    fn three_bin_spec() -> BinSpec {
        BinSpec {
            bins: vec![
                BinDef {
                    bin_id: "low".into(),
                    label: "Low".into(),
                    min: None,
                    max: Some(0.0),
                    include_min: true,
                    include_max: false,
                },
                BinDef {
                    bin_id: "mid".into(),
                    label: "Mid".into(),
                    min: Some(0.0),
                    max: Some(10.0),
                    include_min: true,
                    include_max: false,
                },
                BinDef {
                    bin_id: "high".into(),
                    label: "High".into(),
                    min: Some(10.0),
                    max: None,
                    include_min: true,
                    include_max: true,
                },
            ],
        }
    }

    #[test]
    fn valid_partition_has_no_overlap_or_gaps() {
        let spec = three_bin_spec();
        assert!(!bins_have_overlap(&spec));
        assert!(!bins_have_gaps(&spec));
        assert!(validate_bin_spec(&spec).is_empty());
    }

    #[test]
    fn value_to_bin_first_match_wins() {
        let spec = three_bin_spec();
        assert_eq!(value_to_bin(Some(-5.0), &spec), Ok("low"));
        assert_eq!(value_to_bin(Some(0.0), &spec), Ok("mid"));
        assert_eq!(value_to_bin(Some(9.999), &spec), Ok("mid"));
        assert_eq!(value_to_bin(Some(10.0), &spec), Ok("high"));
        assert_eq!(value_to_bin(Some(1000.0), &spec), Ok("high"));
    }

    #[test]
    fn value_to_bin_missing_value() {
        let spec = three_bin_spec();
        assert_eq!(value_to_bin(None, &spec), Err(BinMapError::MissingValue));
    }

    #[test]
    fn overlapping_bins_are_detected() {
        let mut spec = three_bin_spec();
        spec.bins[1].max = Some(15.0); // now overlaps with "high"
        assert!(bins_have_overlap(&spec));
    }

    #[test]
    fn gap_between_bins_is_detected() {
        let mut spec = three_bin_spec();
        spec.bins[1].max = Some(5.0); // leaves [5, 10) uncovered
        assert!(bins_have_gaps(&spec));
    }

    #[test]
    fn fewer_than_two_bins_is_invalid() {
        let spec = BinSpec {
            bins: vec![BinDef {
                bin_id: "only".into(),
                label: "Only".into(),
                min: None,
                max: None,
                include_min: true,
                include_max: false,
            }],
        };
        let errors = validate_bin_spec(&spec);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at least 2 bins"));
    }

    #[test]
    fn duplicate_bin_ids_are_reported() {
        let mut spec = three_bin_spec();
        spec.bins[2].bin_id = "mid".to_string();
        let errors = validate_bin_spec(&spec);
        assert!(errors.iter().any(|e| e.contains("duplicate bin_id")));
    }

    #[test]
    fn out_of_range_value_with_no_overflow_bin() {
        let spec = BinSpec {
            bins: vec![
                BinDef {
                    bin_id: "a".into(),
                    label: "A".into(),
                    min: Some(0.0),
                    max: Some(5.0),
                    include_min: true,
                    include_max: false,
                },
                BinDef {
                    bin_id: "b".into(),
                    label: "B".into(),
                    min: Some(5.0),
                    max: Some(10.0),
                    include_min: true,
                    include_max: true,
                },
            ],
        };
        assert_eq!(value_to_bin(Some(100.0), &spec), Err(BinMapError::OutOfRange));
    }
}
