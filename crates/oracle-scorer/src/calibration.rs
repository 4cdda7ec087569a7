// crates/oracle-scorer/src/calibration.rs
// ============================================================================
// Module: Calibration
// Description: Binning predicted probabilities against observed frequencies.
// Purpose: Share one binning routine between the binary YES-probability
//          calibration table and the per-outcome multinomial calibration
//          tables, since both reduce to "bin a probability against a 0/1
//          indicator".
// Dependencies: serde
// ============================================================================

use serde::Serialize;

/// Number of equal-width bins calibration is reported over.
const BIN_COUNT: usize = 10;

/// One bin of the calibration table: how many forecasts landed in
/// `[lower, upper)` (or `[lower, upper]` for the last bin), what they
/// predicted on average, and how often the predicted side actually occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationBin {
    /// Lower bound of the bin, inclusive.
    pub lower: f64,
    /// Upper bound of the bin. Exclusive except for the last bin, which is
    /// closed on the right so a forecast of exactly `1.0` has a home.
    pub upper: f64,
    /// Number of forecasts whose predicted probability fell in this bin.
    pub count: u64,
    /// Mean predicted probability of the forecasts in this bin.
    pub mean_forecast: f64,
    /// Observed frequency of the indicator event among this bin's
    /// forecasts.
    pub observed_frequency: f64,
}

/// A full calibration table: per-bin detail plus one summary error figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calibration {
    /// Bins in ascending order, including empty ones.
    pub bins: Vec<CalibrationBin>,
    /// Count-weighted mean absolute gap between `mean_forecast` and
    /// `observed_frequency`, over non-empty bins only.
    pub calibration_error: f64,
}

/// Maps a probability in `[0, 1]` to its bin index, with the last bin
/// `[0.9, 1.0]` closed on the right.
fn bin_index(p: f64) -> usize {
    let raw = (p * BIN_COUNT as f64).floor();
    if raw < 0.0 {
        0
    } else if raw as usize >= BIN_COUNT {
        BIN_COUNT - 1
    } else {
        raw as usize
    }
}

/// Bins `pairs` of `(predicted_probability, observed_indicator)` into
/// [`BIN_COUNT`] equal-width bins over `[0, 1]` and computes the
/// count-weighted calibration error.
///
/// `observed_indicator` is `1.0` when the predicted side occurred, `0.0`
/// otherwise.
#[must_use]
pub fn compute_calibration(pairs: &[(f64, f64)]) -> Calibration {
    let mut sums = vec![0.0_f64; BIN_COUNT];
    let mut observed = vec![0.0_f64; BIN_COUNT];
    let mut counts = vec![0_u64; BIN_COUNT];

    for &(p, indicator) in pairs {
        let idx = bin_index(p);
        sums[idx] += p;
        observed[idx] += indicator;
        counts[idx] += 1;
    }

    let mut bins = Vec::with_capacity(BIN_COUNT);
    let mut weighted_gap_sum = 0.0;
    let mut total_count = 0_u64;

    for idx in 0 .. BIN_COUNT {
        let lower = idx as f64 / BIN_COUNT as f64;
        let upper = (idx + 1) as f64 / BIN_COUNT as f64;
        let count = counts[idx];
        let mean_forecast = if count == 0 { 0.0 } else { sums[idx] / count as f64 };
        let observed_frequency = if count == 0 { 0.0 } else { observed[idx] / count as f64 };

        if count > 0 {
            weighted_gap_sum += count as f64 * (mean_forecast - observed_frequency).abs();
            total_count += count;
        }

        bins.push(CalibrationBin { lower, upper, count, mean_forecast, observed_frequency });
    }

    let calibration_error =
        if total_count == 0 { 0.0 } else { weighted_gap_sum / total_count as f64 };

    Calibration { bins, calibration_error }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn perfectly_calibrated_forecasts_have_zero_error() {
        let pairs = vec![(0.05, 0.0), (0.05, 0.0), (0.95, 1.0), (0.95, 1.0)];
        let calibration = compute_calibration(&pairs);
        assert!((calibration.calibration_error - 0.0).abs() < 1e-9);
    }

    #[test]
    fn exact_one_lands_in_last_bin() {
        let pairs = vec![(1.0, 1.0)];
        let calibration = compute_calibration(&pairs);
        assert_eq!(calibration.bins[9].count, 1);
        for bin in &calibration.bins[.. 9] {
            assert_eq!(bin.count, 0);
        }
    }

    #[test]
    fn exact_zero_lands_in_first_bin() {
        let pairs = vec![(0.0, 0.0)];
        let calibration = compute_calibration(&pairs);
        assert_eq!(calibration.bins[0].count, 1);
    }

    #[test]
    fn empty_input_has_zero_error_and_all_empty_bins() {
        let calibration = compute_calibration(&[]);
        assert_eq!(calibration.calibration_error, 0.0);
        assert!(calibration.bins.iter().all(|b| b.count == 0));
    }

    #[test]
    fn miscalibrated_forecasts_report_nonzero_error() {
        let pairs = vec![(0.9, 0.0), (0.9, 0.0), (0.9, 1.0)];
        let calibration = compute_calibration(&pairs);
        assert!(calibration.calibration_error > 0.0);
    }
}
