//! State and hooks shared by the element subclasses

use crate::filter::{GainControl, GainFilter};
use crate::error::FilterError;
use crate::properties::{GainProperties, PropertySpec};
use atomic_refcell::AtomicRefCell;
use gst::glib;
use gst::prelude::*;
use std::sync::LazyLock;

pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "volctl",
        gst::DebugColorFlags::empty(),
        Some("In-place gain elements"),
    )
});

/// Caps both elements register their pad templates with
pub(crate) static ALLOWED_CAPS: LazyLock<gst::Caps> =
    LazyLock::new(crate::caps::pad_template_caps);

/// Per-instance state of a gain element
///
/// `control` is touched from the application thread, `filter` only from the
/// streaming thread.
pub(crate) struct ElementState<P> {
    control: GainControl<P>,
    filter: AtomicRefCell<GainFilter<P>>,
}

impl<P: GainProperties> Default for ElementState<P> {
    fn default() -> Self {
        let filter = GainFilter::new();
        Self {
            control: filter.control(),
            filter: AtomicRefCell::new(filter),
        }
    }
}

impl<P: GainProperties> ElementState<P> {
    pub(crate) fn param_specs() -> Vec<glib::ParamSpec> {
        P::SPECS.iter().map(PropertySpec::to_param_spec).collect()
    }

    pub(crate) fn element_metadata() -> gst::subclass::ElementMetadata {
        let meta = P::METADATA;
        gst::subclass::ElementMetadata::new(
            meta.long_name,
            meta.classification,
            meta.description,
            meta.author,
        )
    }

    pub(crate) fn set_property(
        &self,
        element: &gst_base::BaseTransform,
        value: &glib::Value,
        pspec: &glib::ParamSpec,
    ) {
        let value = match value.get::<f64>() {
            Ok(value) => value,
            Err(err) => {
                gst::warning!(CAT, obj = element, "Invalid value for {}: {}", pspec.name(), err);
                return;
            }
        };

        match self.control.set_property(element, pspec.name(), value) {
            Ok(()) => {
                gst::info!(CAT, obj = element, "Changed {} to {}", pspec.name(), value);
            }
            Err(err) => gst::warning!(CAT, obj = element, "{}", err),
        }
    }

    pub(crate) fn property(&self, pspec: &glib::ParamSpec) -> glib::Value {
        match self.control.property(pspec.name()) {
            Ok(value) => value.to_value(),
            Err(_) => pspec.default_value().clone(),
        }
    }

    pub(crate) fn setup(
        &self,
        element: &gst_base::BaseTransform,
        info: &gst_audio::AudioInfo,
    ) -> Result<(), gst::LoggableError> {
        gst::debug!(CAT, obj = element, "Configuring for {:?}", info);
        self.filter
            .borrow_mut()
            .setup(element, info)
            .map_err(|err| gst::loggable_error!(CAT, "{}", err))
    }

    pub(crate) fn before_transform(&self, element: &gst_base::BaseTransform) {
        self.filter.borrow_mut().before_transform(element);
    }

    pub(crate) fn transform_ip(
        &self,
        element: &gst_base::BaseTransform,
        buffer: &mut gst::BufferRef,
    ) -> Result<gst::FlowSuccess, gst::FlowError> {
        match self.filter.borrow_mut().transform_ip(buffer) {
            Ok(()) => Ok(gst::FlowSuccess::Ok),
            Err(err) => {
                match err {
                    FilterError::Negotiation(_) => {
                        gst::element_error!(element, gst::CoreError::Negotiation, ["{}", err]);
                    }
                    _ => gst::element_error!(element, gst::StreamError::Failed, ["{}", err]),
                }
                Err(err.into())
            }
        }
    }

    /// Answer a caps query on the sink pad, `None` for any other query
    pub(crate) fn sink_caps_query(
        &self,
        element: &gst_base::BaseTransform,
        query: &mut gst::QueryRef,
    ) -> Option<bool> {
        if !matches!(query.view(), gst::QueryView::Caps(_)) {
            return None;
        }
        let answered = self.control.sink_query(element, query);
        gst::log!(CAT, obj = element, "Answered caps query: {:?}", query);
        Some(answered)
    }

    /// Drop the negotiated format, keeping property values
    pub(crate) fn reset(&self) {
        self.filter.borrow_mut().reset();
    }
}
