//! Gain derivation for volctl filters
//!
//! Converts loudness measurements into the linear multiplier a gain filter
//! applies. Measuring loudness is out of scope here: the integrated loudness
//! arrives precomputed (from an EBU R128 analysis pass or stored tags).
//!
//! ```text
//! integrated LUFS ─┐
//!                  ├─► gain dB = target − integrated ─► 10^(dB/20) ─► DerivedGain
//! target LUFS    ──┘
//! ```
//!
//! # Example
//!
//! ```
//! use volctl_loudness::DerivedGain;
//!
//! let gain = DerivedGain::from_loudness(-12.0, -23.0);
//! assert!((gain.volume - 0.281838).abs() < 1e-6);
//! assert!(!gain.passthrough);
//! ```

mod gain;

pub use gain::{db_to_linear, linear_to_db, normalizing_gain_db, DerivedGain};

/// Gain multiplier that leaves samples untouched
pub const NEUTRAL_VOLUME: f64 = 1.0;

/// Gain multiplier that silences the stream
pub const MUTE_VOLUME: f64 = 0.0;

/// EBU R128 broadcast reference level (-23 LUFS)
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;

/// Common streaming platform reference level (-14 LUFS)
pub const EBU_R128_STREAMING_LUFS: f64 = -14.0;
