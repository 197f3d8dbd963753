//! The gain core shared by both elements
//!
//! `GainFilter` is owned by the streaming context and implements the hooks a
//! base transform calls per stream: `setup`, `before_transform` and
//! `transform_ip`. `GainControl` is the cloneable control-plane handle that
//! sets properties and answers caps queries from any thread.
//!
//! Host callbacks are passed in per call, so the same core runs inside the
//! GStreamer elements and under a hand-written driver.

use crate::caps;
use crate::error::{NegotiationError, Result};
use crate::host::TransformHost;
use crate::negotiator::{CommittedParams, ParameterNegotiator};
use crate::properties::{GainProperties, LoudnessProperties, VolumeProperties};
use crate::transform::transform_in_place;
use std::sync::Arc;
use tracing::{debug, error};

/// Gain core of the plain volume element
pub type VolumeGain = GainFilter<VolumeProperties>;

/// Gain core of the EBU R128 loudness-control element
pub type LoudnessGain = GainFilter<LoudnessProperties>;

/// Control-plane handle to a [`GainFilter`]
pub struct GainControl<P> {
    negotiator: Arc<ParameterNegotiator<P>>,
}

impl<P> Clone for GainControl<P> {
    fn clone(&self) -> Self {
        Self {
            negotiator: Arc::clone(&self.negotiator),
        }
    }
}

impl<P: GainProperties> GainControl<P> {
    /// Set a property by name
    ///
    /// Asks `host` for upstream renegotiation when passthrough eligibility
    /// changed. The settings lock is released before the host is called.
    pub fn set_property<H>(&self, host: &H, name: &str, value: f64) -> Result<()>
    where
        H: TransformHost + ?Sized,
    {
        let reconfigure = self.negotiator.set_property(name, value)?;
        if reconfigure {
            debug!(element = P::FACTORY_NAME, "passthrough changed, reconfiguring sink");
            host.reconfigure_sink();
        }
        Ok(())
    }

    /// Read a property by name
    pub fn property(&self, name: &str) -> Result<f64> {
        self.negotiator.property(name)
    }

    /// Caps acceptable on the sink pad, recomputed on every call
    pub fn sink_caps<H>(&self, host: &H, filter: Option<&gst::Caps>) -> gst::Caps
    where
        H: TransformHost + ?Sized,
    {
        let passthrough = self.negotiator.derived().passthrough;
        let downstream = host.src_allowed_caps();
        caps::sink_caps(passthrough, downstream.as_ref(), filter)
    }

    /// Sink pad query handler
    ///
    /// Answers caps queries; everything else goes to the host's default
    /// handler.
    pub fn sink_query<H>(&self, host: &H, query: &mut gst::QueryRef) -> bool
    where
        H: TransformHost + ?Sized,
    {
        match query.view_mut() {
            gst::QueryViewMut::Caps(q) => {
                let filter = q.filter().map(ToOwned::to_owned);
                let caps = self.sink_caps(host, filter.as_ref());
                debug!(element = P::FACTORY_NAME, %caps, "returning sink caps");
                q.set_result(&caps);
                true
            }
            _ => host.query_default(query),
        }
    }
}

impl GainControl<VolumeProperties> {
    pub fn set_volume<H: TransformHost + ?Sized>(&self, host: &H, volume: f64) -> Result<()> {
        self.set_property(host, VolumeProperties::VOLUME, volume)
    }

    pub fn volume(&self) -> Result<f64> {
        self.property(VolumeProperties::VOLUME)
    }
}

impl GainControl<LoudnessProperties> {
    pub fn set_integrated_loudness<H: TransformHost + ?Sized>(
        &self,
        host: &H,
        lufs: f64,
    ) -> Result<()> {
        self.set_property(host, LoudnessProperties::INTEGRATED_LOUDNESS, lufs)
    }

    pub fn set_target_level<H: TransformHost + ?Sized>(&self, host: &H, lufs: f64) -> Result<()> {
        self.set_property(host, LoudnessProperties::TARGET_LEVEL, lufs)
    }

    pub fn integrated_loudness(&self) -> Result<f64> {
        self.property(LoudnessProperties::INTEGRATED_LOUDNESS)
    }

    pub fn target_level(&self) -> Result<f64> {
        self.property(LoudnessProperties::TARGET_LEVEL)
    }
}

/// In-place gain transform for one stream
pub struct GainFilter<P> {
    negotiator: Arc<ParameterNegotiator<P>>,
    info: Option<gst_audio::AudioInfo>,
    committed: CommittedParams,
}

impl<P: GainProperties> Default for GainFilter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GainProperties> GainFilter<P> {
    pub fn new() -> Self {
        Self {
            negotiator: Arc::new(ParameterNegotiator::new()),
            info: None,
            committed: CommittedParams::default(),
        }
    }

    /// Handle for setting properties from other threads
    pub fn control(&self) -> GainControl<P> {
        GainControl {
            negotiator: Arc::clone(&self.negotiator),
        }
    }

    pub fn committed(&self) -> &CommittedParams {
        &self.committed
    }

    pub fn is_negotiated(&self) -> bool {
        self.committed.negotiated
    }

    /// Format of the last setup, successful or not
    pub fn info(&self) -> Option<&gst_audio::AudioInfo> {
        self.info.as_ref()
    }

    /// Forget the negotiated format, keeping property values
    pub fn reset(&mut self) {
        self.info = None;
        self.committed = CommittedParams::default();
    }

    /// Whether buffers currently bypass the transform
    pub fn is_passthrough(&self) -> bool {
        self.committed.gain.passthrough
    }

    fn commit_params<H>(
        &mut self,
        host: &H,
        info: &gst_audio::AudioInfo,
    ) -> std::result::Result<(), NegotiationError>
    where
        H: TransformHost + ?Sized,
    {
        self.committed.negotiated = false;

        let (properties, gain) = self.negotiator.snapshot();
        debug!(element = P::FACTORY_NAME, ?properties, "configure");
        debug!(element = P::FACTORY_NAME, volume = gain.volume, "configure volume");
        debug!(element = P::FACTORY_NAME, passthrough = gain.passthrough, "set passthrough");

        host.set_passthrough(gain.passthrough);

        match CommittedParams::commit(gain, info) {
            Ok(committed) => {
                self.committed = committed;
                Ok(())
            }
            Err(err) => {
                self.committed = CommittedParams::rejected(gain);
                Err(err)
            }
        }
    }

    /// Commit parameters for a newly negotiated stream format
    ///
    /// Fails when the format has no scaling routine and the current gain is
    /// not passthrough; the filter then stays un-negotiated.
    pub fn setup<H>(&mut self, host: &H, info: &gst_audio::AudioInfo) -> Result<()>
    where
        H: TransformHost + ?Sized,
    {
        self.info = Some(info.clone());
        self.commit_params(host, info).map_err(|err| {
            error!(element = P::FACTORY_NAME, format = %info.format(), "{}", err);
            err.into()
        })
    }

    /// Recommit when the derived parameters moved since the last commit
    ///
    /// Runs once per buffer, right before the transform.
    pub fn before_transform<H>(&mut self, host: &H)
    where
        H: TransformHost + ?Sized,
    {
        let derived = self.negotiator.derived();
        if !self.committed.is_stale(&derived) {
            return;
        }

        let Some(info) = self.info.clone() else {
            debug!(element = P::FACTORY_NAME, "parameters changed before any format was set");
            return;
        };

        if let Err(err) = self.commit_params(host, &info) {
            error!(element = P::FACTORY_NAME, format = %info.format(), "{}", err);
        }
    }

    /// Apply the committed gain to `buffer` in place
    pub fn transform_ip(&mut self, buffer: &mut gst::BufferRef) -> Result<()> {
        transform_in_place(&self.committed, buffer).inspect_err(|err| {
            error!(element = P::FACTORY_NAME, "{}", err);
        })
    }

    /// Process one buffer the way a base transform drives the hooks
    ///
    /// Recommits stale parameters, then skips the transform while in
    /// passthrough.
    pub fn chain<H>(&mut self, host: &H, buffer: &mut gst::BufferRef) -> Result<()>
    where
        H: TransformHost + ?Sized,
    {
        self.before_transform(host);

        if !self.committed.negotiated {
            error!(element = P::FACTORY_NAME, "{}", NegotiationError::NotNegotiated);
            return Err(NegotiationError::NotNegotiated.into());
        }
        if self.committed.gain.passthrough {
            return Ok(());
        }

        self.transform_ip(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHost {
        passthrough: AtomicBool,
        reconfigures: AtomicUsize,
    }

    impl TransformHost for CountingHost {
        fn set_passthrough(&self, passthrough: bool) {
            self.passthrough.store(passthrough, Ordering::SeqCst);
        }

        fn reconfigure_sink(&self) {
            self.reconfigures.fetch_add(1, Ordering::SeqCst);
        }

        fn src_allowed_caps(&self) -> Option<gst::Caps> {
            None
        }

        fn query_default(&self, _query: &mut gst::QueryRef) -> bool {
            false
        }
    }

    fn info(format: gst_audio::AudioFormat) -> gst_audio::AudioInfo {
        gst::init().unwrap();
        gst_audio::AudioInfo::builder(format, 48000, 2)
            .build()
            .unwrap()
    }

    fn f32_buffer(samples: &[f32]) -> gst::Buffer {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        gst::Buffer::from_mut_slice(bytes)
    }

    fn f32_samples(buffer: &gst::BufferRef) -> Vec<f32> {
        let map = buffer.map_readable().unwrap();
        map.as_slice()
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_setup_commits_passthrough() {
        let host = CountingHost::default();
        let mut filter = VolumeGain::new();
        filter.setup(&host, &info(gst_audio::AUDIO_FORMAT_F32)).unwrap();

        assert!(filter.is_negotiated());
        assert!(filter.is_passthrough());
        assert!(host.passthrough.load(Ordering::SeqCst));
    }

    #[test]
    fn test_setup_rejects_integer_when_not_neutral() {
        let host = CountingHost::default();
        let mut filter = VolumeGain::new();
        filter.control().set_volume(&host, 0.5).unwrap();

        let err = filter
            .setup(&host, &info(gst_audio::AudioFormat::S16le))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::Negotiation(NegotiationError::UnsupportedFormat(
                gst_audio::AudioFormat::S16le
            ))
        );
        assert!(!filter.is_negotiated());
        assert_eq!(
            filter.info().map(|info| info.format()),
            Some(gst_audio::AudioFormat::S16le)
        );
    }

    #[test]
    fn test_reconfigure_only_on_flip() {
        let host = CountingHost::default();
        let filter = VolumeGain::new();
        let control = filter.control();

        control.set_volume(&host, 2.0).unwrap();
        control.set_volume(&host, 3.0).unwrap();
        control.set_volume(&host, 1.0).unwrap();
        assert_eq!(host.reconfigures.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_chain_recommits_changed_volume() {
        let host = CountingHost::default();
        let mut filter = VolumeGain::new();
        filter.setup(&host, &info(gst_audio::AUDIO_FORMAT_F32)).unwrap();

        filter.control().set_volume(&host, 2.0).unwrap();
        let mut buffer = f32_buffer(&[0.5, -0.25]);
        filter.chain(&host, buffer.make_mut()).unwrap();

        assert_eq!(f32_samples(&buffer), vec![1.0, -0.5]);
        assert!(!filter.is_passthrough());
        assert!(!host.passthrough.load(Ordering::SeqCst));
    }

    #[test]
    fn test_chain_before_setup_fails() {
        let host = CountingHost::default();
        let mut filter = LoudnessGain::new();
        gst::init().unwrap();
        let mut buffer = f32_buffer(&[0.5]);

        let err = filter.chain(&host, buffer.make_mut()).unwrap_err();
        assert_eq!(err, FilterError::Negotiation(NegotiationError::NotNegotiated));
        assert_eq!(f32_samples(&buffer), vec![0.5]);
    }

    #[test]
    fn test_loudness_control_gain() {
        let host = CountingHost::default();
        let mut filter = LoudnessGain::new();
        let control = filter.control();
        control.set_integrated_loudness(&host, -29.0).unwrap();
        control.set_target_level(&host, -23.0).unwrap();
        assert_eq!(control.integrated_loudness().unwrap(), -29.0);
        assert_eq!(control.target_level().unwrap(), -23.0);

        filter.setup(&host, &info(gst_audio::AUDIO_FORMAT_F32)).unwrap();
        let expected = volctl_loudness::db_to_linear(6.0);
        assert!((filter.committed().gain.volume - expected).abs() < 1e-12);
    }

    #[test]
    fn test_caps_query_answered() {
        let host = CountingHost::default();
        let filter = VolumeGain::new();
        let control = filter.control();
        control.set_volume(&host, 0.5).unwrap();

        gst::init().unwrap();
        let mut query = gst::query::Caps::new(None);
        assert!(control.sink_query(&host, &mut query));
        let caps = query.result().unwrap().to_owned();
        assert_eq!(caps, crate::caps::template_caps(false));
    }

    #[test]
    fn test_other_queries_use_default() {
        let host = CountingHost::default();
        let filter = VolumeGain::new();
        gst::init().unwrap();

        let mut query = gst::query::Latency::new();
        assert!(!filter.control().sink_query(&host, &mut query));
    }
}
