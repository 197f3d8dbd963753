//! Static element descriptions

use crate::properties::{GainProperties, LoudnessProperties, PropertySpec, VolumeProperties};

/// Prefix shared by every factory name in this plugin
pub const FACTORY_PREFIX: &str = "volctl-";

/// Descriptive element metadata shown by plugin inspectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMetadata {
    pub long_name: &'static str,
    pub classification: &'static str,
    pub description: &'static str,
    pub author: &'static str,
}

/// The element variants this crate provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Plain linear gain
    Volume,
    /// Gain derived from EBU R128 loudness values
    Ebur128Control,
}

impl ElementKind {
    pub const ALL: [Self; 2] = [Self::Volume, Self::Ebur128Control];

    /// Look up a variant by its factory name, with or without the plugin prefix
    pub fn from_factory_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let short = name.strip_prefix(FACTORY_PREFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|kind| {
            let factory = kind.factory_name();
            factory.eq_ignore_ascii_case(name)
                || factory
                    .strip_prefix(FACTORY_PREFIX)
                    .is_some_and(|own| own.eq_ignore_ascii_case(short))
        })
    }

    pub fn factory_name(&self) -> &'static str {
        match self {
            Self::Volume => VolumeProperties::FACTORY_NAME,
            Self::Ebur128Control => LoudnessProperties::FACTORY_NAME,
        }
    }

    pub fn property_specs(&self) -> &'static [PropertySpec] {
        match self {
            Self::Volume => VolumeProperties::SPECS,
            Self::Ebur128Control => LoudnessProperties::SPECS,
        }
    }
}
