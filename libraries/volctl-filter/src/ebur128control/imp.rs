use gst::glib;
use gst::prelude::*;
use gst::subclass::prelude::*;
use gst_audio::subclass::prelude::*;
use gst_base::prelude::*;

use std::sync::LazyLock;

use crate::element::{ElementState, ALLOWED_CAPS};
use crate::properties::LoudnessProperties;

#[derive(Default)]
pub struct Ebur128Control {
    state: ElementState<LoudnessProperties>,
}

#[glib::object_subclass]
impl ObjectSubclass for Ebur128Control {
    const NAME: &'static str = "VolctlEbur128Control";
    type Type = super::Ebur128Control;
    type ParentType = gst_audio::AudioFilter;
}

impl ObjectImpl for Ebur128Control {
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: LazyLock<Vec<glib::ParamSpec>> =
            LazyLock::new(ElementState::<LoudnessProperties>::param_specs);

        PROPERTIES.as_ref()
    }

    fn constructed(&self) {
        self.parent_constructed();
        self.obj().set_gap_aware(true);
    }

    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        self.state.set_property(self.obj().upcast_ref(), value, pspec);
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        self.state.property(pspec)
    }
}

impl GstObjectImpl for Ebur128Control {}

impl ElementImpl for Ebur128Control {
    fn metadata() -> Option<&'static gst::subclass::ElementMetadata> {
        static ELEMENT_METADATA: LazyLock<gst::subclass::ElementMetadata> =
            LazyLock::new(ElementState::<LoudnessProperties>::element_metadata);

        Some(&*ELEMENT_METADATA)
    }
}

impl BaseTransformImpl for Ebur128Control {
    const MODE: gst_base::subclass::BaseTransformMode =
        gst_base::subclass::BaseTransformMode::AlwaysInPlace;
    const PASSTHROUGH_ON_SAME_CAPS: bool = false;
    const TRANSFORM_IP_ON_PASSTHROUGH: bool = false;

    fn stop(&self) -> Result<(), gst::ErrorMessage> {
        self.state.reset();
        self.parent_stop()
    }

    fn query(&self, direction: gst::PadDirection, query: &mut gst::QueryRef) -> bool {
        if direction == gst::PadDirection::Sink {
            if let Some(answered) = self.state.sink_caps_query(self.obj().upcast_ref(), query) {
                return answered;
            }
        }
        BaseTransformImplExt::parent_query(self, direction, query)
    }

    fn before_transform(&self, _inbuf: &gst::BufferRef) {
        self.state.before_transform(self.obj().upcast_ref());
    }

    fn transform_ip(&self, buf: &mut gst::BufferRef) -> Result<gst::FlowSuccess, gst::FlowError> {
        self.state.transform_ip(self.obj().upcast_ref(), buf)
    }
}

impl AudioFilterImpl for Ebur128Control {
    fn allowed_caps() -> &'static gst::Caps {
        &ALLOWED_CAPS
    }

    fn setup(&self, info: &gst_audio::AudioInfo) -> Result<(), gst::LoggableError> {
        self.state.setup(self.obj().upcast_ref(), info)?;
        self.parent_setup(info)
    }
}
