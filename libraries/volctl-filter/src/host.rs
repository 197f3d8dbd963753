//! Callbacks from the gain core into the element hosting it

use gst::prelude::*;
use gst_base::prelude::*;

/// Services a hosting transform provides to the gain core
///
/// The element implementation is [`gst_base::BaseTransform`] itself; drivers
/// that push buffers by hand supply their own.
pub trait TransformHost {
    /// Switch the transform in or out of passthrough mode
    ///
    /// While in passthrough the host forwards buffers without calling the
    /// in-place transform.
    fn set_passthrough(&self, passthrough: bool);

    /// Ask for upstream caps negotiation to be redone before the next buffer
    fn reconfigure_sink(&self);

    /// Caps currently allowed by the downstream peer, `None` when unlinked
    fn src_allowed_caps(&self) -> Option<gst::Caps>;

    /// Default handling for sink queries the filter does not answer itself
    fn query_default(&self, query: &mut gst::QueryRef) -> bool;
}

impl TransformHost for gst_base::BaseTransform {
    fn set_passthrough(&self, passthrough: bool) {
        BaseTransformExt::set_passthrough(self, passthrough);
    }

    fn reconfigure_sink(&self) {
        BaseTransformExt::reconfigure_sink(self);
    }

    fn src_allowed_caps(&self) -> Option<gst::Caps> {
        self.src_pad().allowed_caps()
    }

    fn query_default(&self, query: &mut gst::QueryRef) -> bool {
        gst::Pad::query_default(self.sink_pad(), Some(self), query)
    }
}
