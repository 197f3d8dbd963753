use gst::glib;
use gst::prelude::*;

use crate::properties::{GainProperties, VolumeProperties};

mod imp;

glib::wrapper! {
    pub struct Volume(ObjectSubclass<imp::Volume>) @extends gst_audio::AudioFilter, gst_base::BaseTransform, gst::Element, gst::Object;
}

pub fn register(plugin: Option<&gst::Plugin>) -> Result<(), glib::BoolError> {
    gst::Element::register(
        plugin,
        VolumeProperties::FACTORY_NAME,
        gst::Rank::NONE,
        Volume::static_type(),
    )
}
