//! Decibel arithmetic and derived gain parameters

use crate::{MUTE_VOLUME, NEUTRAL_VOLUME};
use serde::{Deserialize, Serialize};

/// Gain in dB that moves `source_lufs` onto `target_lufs`
///
/// A track measured at -12 LUFS with a -23 LUFS target needs -11 dB.
pub fn normalizing_gain_db(source_lufs: f64, target_lufs: f64) -> f64 {
    target_lufs - source_lufs
}

/// Convert a gain in dB to a linear amplitude multiplier
pub fn db_to_linear(gain_db: f64) -> f64 {
    10.0_f64.powf(gain_db / 20.0)
}

/// Convert a linear amplitude multiplier to dB (`-inf` for silence)
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.log10()
}

/// Gain value and passthrough eligibility derived from user settings
///
/// `passthrough` holds exactly when `volume` equals [`NEUTRAL_VOLUME`]. The
/// comparison is exact: only a gain that derives to exactly 1.0 may skip
/// processing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedGain {
    /// Linear multiplier applied to every sample
    pub volume: f64,
    /// Whether the stream can bypass processing entirely
    pub passthrough: bool,
}

impl DerivedGain {
    /// Neutral gain, eligible for passthrough
    pub fn neutral() -> Self {
        Self::from_volume(NEUTRAL_VOLUME)
    }

    /// Use a linear multiplier as is
    pub fn from_volume(volume: f64) -> Self {
        Self {
            volume,
            passthrough: volume == NEUTRAL_VOLUME,
        }
    }

    /// Gain that normalizes `integrated_lufs` to `target_lufs`
    ///
    /// Non-finite inputs are not rejected; they yield an infinite or NaN
    /// volume that is never eligible for passthrough.
    pub fn from_loudness(integrated_lufs: f64, target_lufs: f64) -> Self {
        let gain_db = normalizing_gain_db(integrated_lufs, target_lufs);
        Self::from_volume(db_to_linear(gain_db))
    }

    pub fn is_mute(&self) -> bool {
        self.volume == MUTE_VOLUME
    }

    /// Gain in dB (`-inf` when muted)
    pub fn gain_db(&self) -> f64 {
        linear_to_db(self.volume)
    }
}

impl Default for DerivedGain {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizing_gain_direction() {
        // Louder than target: attenuate
        assert_eq!(normalizing_gain_db(-12.0, -23.0), -11.0);
        // Quieter than target: boost
        assert_eq!(normalizing_gain_db(-30.0, -23.0), 7.0);
    }

    #[test]
    fn test_db_conversions() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-12);
        assert!((db_to_linear(-6.0) - 0.501187).abs() < 1e-6);
        assert!((linear_to_db(0.5) - (-6.0206)).abs() < 1e-4);
        assert_eq!(linear_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_loudness_scenario() {
        let gain = DerivedGain::from_loudness(-12.0, -23.0);
        assert!((gain.volume - 0.28183829312644537).abs() < 1e-12);
        assert!(!gain.passthrough);
        assert!((gain.gain_db() - (-11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_default_loudness_is_neutral() {
        let gain = DerivedGain::from_loudness(-23.0, -23.0);
        assert_eq!(gain, DerivedGain::neutral());
        assert!(gain.passthrough);
        assert_eq!(DerivedGain::default(), DerivedGain::neutral());
    }

    #[test]
    fn test_passthrough_requires_exact_neutral() {
        assert!(!DerivedGain::from_volume(1.0 + f64::EPSILON).passthrough);
        assert!(!DerivedGain::from_volume(0.999_999_999).passthrough);
        assert!(DerivedGain::from_volume(1.0).passthrough);
    }

    #[test]
    fn test_mute() {
        assert!(DerivedGain::from_volume(0.0).is_mute());
        assert!(!DerivedGain::from_volume(0.0).passthrough);
        assert!(!DerivedGain::neutral().is_mute());
    }

    #[test]
    fn test_non_finite_inputs_propagate() {
        let gain = DerivedGain::from_loudness(f64::NEG_INFINITY, -23.0);
        assert_eq!(gain.volume, f64::INFINITY);
        assert!(!gain.passthrough);

        let gain = DerivedGain::from_loudness(f64::NAN, -23.0);
        assert!(gain.volume.is_nan());
        assert!(!gain.passthrough);

        let gain = DerivedGain::from_loudness(f64::INFINITY, -23.0);
        assert!(gain.is_mute());
    }
}
