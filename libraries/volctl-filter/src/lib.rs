//! In-place gain filters for raw float audio
//!
//! Two `GstAudioFilter` subclasses share one implementation:
//! - `volctl-volume`: applies a user-set linear multiplier
//! - `volctl-ebur128control`: derives the multiplier from a measured
//!   integrated loudness and a target level (EBU R128)
//!
//! # Architecture
//!
//! ```text
//!  control plane                      streaming context
//! ┌──────────────┐  set_property  ┌──────────────────────────────┐
//! │ GainControl  │ ─────────────► │ ParameterNegotiator (Mutex)  │
//! └──────────────┘                └──────────────────────────────┘
//!        │ reconfigure_sink                 │ locked snapshot
//!        ▼                                  ▼
//! ┌──────────────┐  setup/chain   ┌──────────────────────────────┐
//! │ BaseTransform│ ─────────────► │ GainFilter: CommittedParams  │
//! └──────────────┘                │   └─► SampleProcessor (F32/F64)
//!                                 └──────────────────────────────┘
//! ```
//!
//! Property changes land in the negotiator under a lock. Before each buffer
//! the streaming side compares its committed snapshot against the derived
//! parameters and recommits when they differ, so a buffer is always processed
//! with one consistent set of gain, processor and passthrough mode.
//!
//! # Example
//!
//! ```
//! use gst::prelude::*;
//!
//! gst::init()?;
//! volctl_filter::register_static()?;
//!
//! let element = gst::ElementFactory::make("volctl-volume")
//!     .property("volume", 2.0f64)
//!     .build()?;
//! assert_eq!(element.property::<f64>("volume"), 2.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod caps;
#[allow(unsafe_code)]
mod ebur128control;
mod element;
mod error;
mod filter;
mod host;
mod metadata;
mod negotiator;
mod processor;
mod properties;
mod transform;
#[allow(unsafe_code)]
mod volume;

pub use caps::{pad_template_caps, sink_caps, template_caps};
pub use ebur128control::Ebur128Control;
pub use error::{FilterError, NegotiationError, Result};
pub use filter::{GainControl, GainFilter, LoudnessGain, VolumeGain};
pub use host::TransformHost;
pub use metadata::{ElementKind, ElementMetadata, FACTORY_PREFIX};
pub use negotiator::{CommittedParams, ParameterNegotiator};
pub use processor::SampleProcessor;
pub use properties::{GainProperties, LoudnessProperties, PropertySpec, VolumeProperties};
pub use volume::Volume;

pub use volctl_loudness::{DerivedGain, MUTE_VOLUME, NEUTRAL_VOLUME};

use gst::glib;

/// Register both elements with the running process
///
/// Call after `gst::init()`. Afterwards the elements are available from
/// `gst::ElementFactory` under their factory names.
pub fn register_static() -> std::result::Result<(), glib::BoolError> {
    volume::register(None)?;
    ebur128control::register(None)?;
    Ok(())
}
