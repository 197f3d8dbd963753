//! Pending and committed gain parameters
//!
//! `ParameterNegotiator` owns the user-set properties and the gain derived from
//! them. It is the only state shared between the control plane and the
//! streaming context, so every access goes through one short-lived lock.
//!
//! `CommittedParams` is the streaming side's private copy. It is replaced
//! wholesale on every commit and never read while half-written.

use crate::error::{NegotiationError, Result};
use crate::processor::SampleProcessor;
use crate::properties::GainProperties;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;
use volctl_loudness::DerivedGain;

#[derive(Debug, Default)]
struct Settings<P> {
    properties: P,
    derived: DerivedGain,
}

/// Lock-guarded user properties and their derived gain
#[derive(Debug)]
pub struct ParameterNegotiator<P> {
    settings: Mutex<Settings<P>>,
}

impl<P: GainProperties> Default for ParameterNegotiator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GainProperties> ParameterNegotiator<P> {
    pub fn new() -> Self {
        let properties = P::default();
        let derived = properties.derive();
        Self {
            settings: Mutex::new(Settings {
                properties,
                derived,
            }),
        }
    }

    // The guarded values are plain data that a panicking holder cannot leave
    // half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Settings<P>> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Update one property and recompute the derived gain
    ///
    /// Returns `true` when passthrough eligibility flipped, meaning upstream
    /// caps must be renegotiated. A change in gain magnitude alone returns
    /// `false`.
    pub fn set_property(&self, name: &str, value: f64) -> Result<bool> {
        let mut settings = self.lock();
        if let Err(err) = settings.properties.set(name, value) {
            warn!(element = P::FACTORY_NAME, property = name, value, "{}", err);
            return Err(err);
        }

        let derived = settings.properties.derive();
        let reconfigure = derived.passthrough != settings.derived.passthrough;
        settings.derived = derived;
        Ok(reconfigure)
    }

    pub fn property(&self, name: &str) -> Result<f64> {
        self.lock().properties.get(name)
    }

    /// Current derived gain
    pub fn derived(&self) -> DerivedGain {
        self.lock().derived
    }

    /// Consistent copy of the properties together with their derived gain
    pub fn snapshot(&self) -> (P, DerivedGain) {
        let settings = self.lock();
        (settings.properties.clone(), settings.derived)
    }
}

/// Parameters the streaming context processes buffers with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedParams {
    pub gain: DerivedGain,
    pub processor: SampleProcessor,
    /// False until a compatible stream format has been accepted
    pub negotiated: bool,
}

impl Default for CommittedParams {
    fn default() -> Self {
        Self {
            gain: DerivedGain::neutral(),
            processor: SampleProcessor::None,
            negotiated: false,
        }
    }
}

impl CommittedParams {
    /// Build the parameter set for `gain` on a stream described by `info`
    ///
    /// Formats without a scaling routine are only acceptable in passthrough.
    pub fn commit(
        gain: DerivedGain,
        info: &gst_audio::AudioInfo,
    ) -> std::result::Result<Self, NegotiationError> {
        let processor = SampleProcessor::for_format(info.format());
        if processor == SampleProcessor::None && !gain.passthrough {
            return Err(NegotiationError::UnsupportedFormat(info.format()));
        }
        Ok(Self {
            gain,
            processor,
            negotiated: true,
        })
    }

    /// Parameters recorded after a failed commit
    pub fn rejected(gain: DerivedGain) -> Self {
        Self {
            gain,
            processor: SampleProcessor::None,
            negotiated: false,
        }
    }

    /// Whether these parameters lag behind `derived`
    pub fn is_stale(&self, derived: &DerivedGain) -> bool {
        self.gain != *derived
    }
}
