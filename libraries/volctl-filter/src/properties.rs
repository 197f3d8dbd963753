//! User-facing element properties
//!
//! Each variant exposes a fixed table of named floating-point properties and
//! knows how to turn its current values into a [`DerivedGain`].

use crate::error::{FilterError, Result};
use crate::metadata::ElementMetadata;
use std::fmt::Debug;
use volctl_loudness::{DerivedGain, EBU_R128_BROADCAST_LUFS, NEUTRAL_VOLUME};

/// Declaration of one floating-point property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub nick: &'static str,
    pub blurb: &'static str,
    pub minimum: f64,
    pub maximum: f64,
    pub default: f64,
}

impl PropertySpec {
    /// Whether `value` lies within the declared range
    ///
    /// Like GLib's double validation, NaN is not out of range.
    pub fn accepts(&self, value: f64) -> bool {
        !(value < self.minimum || value > self.maximum)
    }

    /// Whether `name` refers to this property
    ///
    /// `-` and `_` are interchangeable, as in GObject property names.
    pub fn matches(&self, name: &str) -> bool {
        self.name.len() == name.len()
            && self.name.bytes().zip(name.bytes()).all(|(own, other)| {
                own == other || (matches!(own, b'-' | b'_') && matches!(other, b'-' | b'_'))
            })
    }

    /// GObject property declaration for this spec
    pub fn to_param_spec(&self) -> gst::glib::ParamSpec {
        use gst::prelude::*;

        gst::glib::ParamSpecDouble::builder(self.name)
            .nick(self.nick)
            .blurb(self.blurb)
            .minimum(self.minimum)
            .maximum(self.maximum)
            .default_value(self.default)
            .mutable_playing()
            .build()
    }
}

/// Property set of one element variant
pub trait GainProperties: Debug + Clone + Default + Send + 'static {
    /// Factory name used to instantiate the element
    const FACTORY_NAME: &'static str;

    const METADATA: ElementMetadata;

    /// Declared properties, in installation order
    const SPECS: &'static [PropertySpec];

    /// Compute the gain these settings call for
    fn derive(&self) -> DerivedGain;

    /// Storage for a declared property
    fn field(&self, name: &str) -> Option<f64>;

    /// Mutable storage for a declared property
    fn field_mut(&mut self, name: &str) -> Option<&mut f64>;

    fn spec(name: &str) -> Result<&'static PropertySpec> {
        Self::SPECS
            .iter()
            .find(|spec| spec.matches(name))
            .ok_or_else(|| FilterError::UnknownProperty(name.to_string()))
    }

    /// Read a property by name
    fn get(&self, name: &str) -> Result<f64> {
        let spec = Self::spec(name)?;
        self.field(spec.name)
            .ok_or_else(|| FilterError::UnknownProperty(name.to_string()))
    }

    /// Write a property by name, rejecting values outside its range
    fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let spec = Self::spec(name)?;
        if !spec.accepts(value) {
            return Err(FilterError::InvalidPropertyValue {
                name: name.to_string(),
                value,
            });
        }
        let slot = self
            .field_mut(spec.name)
            .ok_or_else(|| FilterError::UnknownProperty(name.to_string()))?;
        *slot = value;
        Ok(())
    }
}

/// Properties of the plain `volume` element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProperties {
    /// Linear gain multiplier
    pub volume: f64,
}

impl VolumeProperties {
    pub const VOLUME: &'static str = "volume";
}

impl Default for VolumeProperties {
    fn default() -> Self {
        Self {
            volume: NEUTRAL_VOLUME,
        }
    }
}

impl GainProperties for VolumeProperties {
    const FACTORY_NAME: &'static str = "volctl-volume";

    const METADATA: ElementMetadata = ElementMetadata {
        long_name: "Volume",
        classification: "Filter/Effect/Audio",
        description: "Apply a linear gain to raw float audio streams",
        author: "volctl Contributors",
    };

    const SPECS: &'static [PropertySpec] = &[PropertySpec {
        name: Self::VOLUME,
        nick: "Volume",
        blurb: "Linear volume factor, 1.0 = 100%",
        minimum: 0.0,
        maximum: f64::MAX,
        default: NEUTRAL_VOLUME,
    }];

    fn derive(&self) -> DerivedGain {
        DerivedGain::from_volume(self.volume)
    }

    fn field(&self, name: &str) -> Option<f64> {
        (name == Self::VOLUME).then_some(self.volume)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        (name == Self::VOLUME).then_some(&mut self.volume)
    }
}

/// Properties of the `ebur128control` element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessProperties {
    /// Measured integrated loudness of the stream (LUFS)
    pub integrated_loudness_lufs: f64,
    /// Loudness the stream should be brought to (LUFS)
    pub target_level_lufs: f64,
}

impl LoudnessProperties {
    pub const INTEGRATED_LOUDNESS: &'static str = "integrated-loudness-lufs";
    pub const TARGET_LEVEL: &'static str = "target-level-lufs";
}

impl Default for LoudnessProperties {
    fn default() -> Self {
        Self {
            integrated_loudness_lufs: EBU_R128_BROADCAST_LUFS,
            target_level_lufs: EBU_R128_BROADCAST_LUFS,
        }
    }
}

impl GainProperties for LoudnessProperties {
    const FACTORY_NAME: &'static str = "volctl-ebur128control";

    const METADATA: ElementMetadata = ElementMetadata {
        long_name: "EBUR128Control",
        classification: "Filter/Effect/Audio",
        description: "Control EBU R 128 loudness characteristics of audio/raw streams",
        author: "volctl Contributors",
    };

    const SPECS: &'static [PropertySpec] = &[
        PropertySpec {
            name: Self::INTEGRATED_LOUDNESS,
            nick: "integrated loudness",
            blurb: "EBU R 128 Integrated Loudness [LUFS]",
            minimum: f64::MIN,
            maximum: f64::MAX,
            default: EBU_R128_BROADCAST_LUFS,
        },
        PropertySpec {
            name: Self::TARGET_LEVEL,
            nick: "target level",
            blurb: "EBU R 128 Target Level [LUFS]",
            minimum: f64::MIN,
            maximum: f64::MAX,
            default: EBU_R128_BROADCAST_LUFS,
        },
    ];

    fn derive(&self) -> DerivedGain {
        DerivedGain::from_loudness(self.integrated_loudness_lufs, self.target_level_lufs)
    }

    fn field(&self, name: &str) -> Option<f64> {
        match name {
            Self::INTEGRATED_LOUDNESS => Some(self.integrated_loudness_lufs),
            Self::TARGET_LEVEL => Some(self.target_level_lufs),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            Self::INTEGRATED_LOUDNESS => Some(&mut self.integrated_loudness_lufs),
            Self::TARGET_LEVEL => Some(&mut self.target_level_lufs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_specs() {
        let volume = VolumeProperties::default();
        for spec in VolumeProperties::SPECS {
            assert_eq!(volume.get(spec.name).unwrap(), spec.default);
        }

        let loudness = LoudnessProperties::default();
        for spec in LoudnessProperties::SPECS {
            assert_eq!(loudness.get(spec.name).unwrap(), spec.default);
        }
    }

    #[test]
    fn test_defaults_are_neutral() {
        assert!(VolumeProperties::default().derive().passthrough);
        assert!(LoudnessProperties::default().derive().passthrough);
    }

    #[test]
    fn test_set_and_get() {
        let mut props = LoudnessProperties::default();
        props.set("integrated-loudness-lufs", -12.0).unwrap();
        assert_eq!(props.get("integrated-loudness-lufs").unwrap(), -12.0);
        assert_eq!(props.get("target-level-lufs").unwrap(), -23.0);
        assert!(!props.derive().passthrough);
    }

    #[test]
    fn test_underscore_names() {
        let mut props = LoudnessProperties::default();
        props.set("target_level_lufs", -14.0).unwrap();
        assert_eq!(props.target_level_lufs, -14.0);
        assert_eq!(props.get("target_level_lufs").unwrap(), -14.0);
        assert!(props.get("target_level-lufsx").is_err());
    }

    #[test]
    fn test_unknown_property() {
        let mut props = VolumeProperties::default();
        assert_eq!(
            props.set("gain", 2.0),
            Err(FilterError::UnknownProperty("gain".into()))
        );
        assert_eq!(
            props.get("mute"),
            Err(FilterError::UnknownProperty("mute".into()))
        );
    }

    #[test]
    fn test_volume_range() {
        let mut props = VolumeProperties::default();
        assert!(props.set("volume", -0.5).is_err());
        assert_eq!(props.volume, 1.0);

        props.set("volume", 0.0).unwrap();
        props.set("volume", 10.0).unwrap();
        props.set("volume", f64::MAX).unwrap();
        assert_eq!(props.volume, f64::MAX);
    }

    #[test]
    fn test_infinite_volume_rejected() {
        let mut props = VolumeProperties::default();
        let err = props.set("volume", f64::INFINITY).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPropertyValue { .. }));
        assert_eq!(props.volume, 1.0);
    }

    #[test]
    fn test_loudness_range() {
        let mut props = LoudnessProperties::default();
        props.set("integrated-loudness-lufs", 1.0e300).unwrap();
        props.set("target-level-lufs", f64::MIN).unwrap();
        assert_eq!(props.target_level_lufs, f64::MIN);
        assert!(props.set("target-level-lufs", f64::NEG_INFINITY).is_err());
        assert_eq!(props.target_level_lufs, f64::MIN);
    }

    #[test]
    fn test_nan_passes_validation() {
        let mut props = LoudnessProperties::default();
        props.set("integrated-loudness-lufs", f64::NAN).unwrap();
        assert!(props.derive().volume.is_nan());
    }

    #[test]
    fn test_param_specs() {
        let pspec = VolumeProperties::SPECS[0].to_param_spec();
        assert_eq!(pspec.name(), "volume");
        assert_eq!(pspec.nick(), "Volume");

        let pspec = LoudnessProperties::SPECS[1]
            .to_param_spec()
            .downcast::<gst::glib::ParamSpecDouble>()
            .unwrap();
        assert_eq!(pspec.name(), "target-level-lufs");
        assert_eq!(pspec.maximum(), f64::MAX);
        assert_eq!(pspec.default_value(), -23.0);
    }
}
