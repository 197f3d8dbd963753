use gst::glib;
use gst::prelude::*;

use crate::properties::{GainProperties, LoudnessProperties};

mod imp;

glib::wrapper! {
    pub struct Ebur128Control(ObjectSubclass<imp::Ebur128Control>) @extends gst_audio::AudioFilter, gst_base::BaseTransform, gst::Element, gst::Object;
}

pub fn register(plugin: Option<&gst::Plugin>) -> Result<(), glib::BoolError> {
    gst::Element::register(
        plugin,
        LoudnessProperties::FACTORY_NAME,
        gst::Rank::NONE,
        Ebur128Control::static_type(),
    )
}
