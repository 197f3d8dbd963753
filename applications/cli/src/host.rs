//! Host callbacks for an offline file pipeline

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};
use volctl_filter::TransformHost;

/// Host that logs callbacks and keeps the latest passthrough decision
///
/// The file sink accepts any raw audio, so no downstream caps are reported.
#[derive(Debug, Default)]
pub struct LoggingHost {
    passthrough: AtomicBool,
    reconfigure_requests: AtomicUsize,
}

impl LoggingHost {
    pub fn is_passthrough(&self) -> bool {
        self.passthrough.load(Ordering::Acquire)
    }

    pub fn reconfigure_requests(&self) -> usize {
        self.reconfigure_requests.load(Ordering::Acquire)
    }
}

impl TransformHost for LoggingHost {
    fn set_passthrough(&self, passthrough: bool) {
        let previous = self.passthrough.swap(passthrough, Ordering::AcqRel);
        if previous != passthrough {
            info!(passthrough, "transform mode changed");
        }
    }

    fn reconfigure_sink(&self) {
        self.reconfigure_requests.fetch_add(1, Ordering::AcqRel);
        debug!("sink reconfiguration requested");
    }

    fn src_allowed_caps(&self) -> Option<gst::Caps> {
        None
    }

    fn query_default(&self, query: &mut gst::QueryRef) -> bool {
        debug!(?query, "unhandled query");
        false
    }
}
