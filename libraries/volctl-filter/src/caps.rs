//! Capability negotiation for the upstream-facing pad

use gst_audio::{AUDIO_FORMAT_F32, AUDIO_FORMAT_F64};

/// Template caps for the current passthrough eligibility
///
/// Passthrough accepts any raw audio since samples are never touched.
/// Otherwise only the float formats with a scaling routine are allowed.
pub fn template_caps(passthrough: bool) -> gst::Caps {
    if passthrough {
        gst::Caps::new_empty_simple("audio/x-raw")
    } else {
        gst::Caps::builder("audio/x-raw")
            .field(
                "format",
                gst::List::new([
                    AUDIO_FORMAT_F32.to_str().as_str(),
                    AUDIO_FORMAT_F64.to_str().as_str(),
                ]),
            )
            .build()
    }
}

/// Caps installed on the element's pad templates
pub fn pad_template_caps() -> gst::Caps {
    template_caps(true)
}

/// Caps the sink pad can accept right now
///
/// Intersects the template for `passthrough` with what downstream allows
/// (`None` when the source pad is unlinked) and with the query filter.
pub fn sink_caps(
    passthrough: bool,
    downstream: Option<&gst::Caps>,
    filter: Option<&gst::Caps>,
) -> gst::Caps {
    let template = template_caps(passthrough);

    let caps = match downstream {
        Some(downstream) => template.intersect_with_mode(downstream, gst::CapsIntersectMode::First),
        None => template,
    };

    match filter {
        Some(filter) => caps.intersect_with_mode(filter, gst::CapsIntersectMode::First),
        None => caps,
    }
}
