//! In-place gain application

use crate::error::{FilterError, NegotiationError, Result};
use crate::negotiator::CommittedParams;
use volctl_loudness::NEUTRAL_VOLUME;

/// Apply the committed gain to one buffer
///
/// Gap buffers pass untouched. A mute gain zero-fills the buffer and flags it
/// as gap; a neutral gain leaves it as is.
pub(crate) fn transform_in_place(
    params: &CommittedParams,
    buffer: &mut gst::BufferRef,
) -> Result<()> {
    if !params.negotiated {
        return Err(NegotiationError::NotNegotiated.into());
    }

    if buffer.flags().contains(gst::BufferFlags::GAP) {
        return Ok(());
    }

    let mute = params.gain.is_mute();
    if !mute && params.gain.volume == NEUTRAL_VOLUME {
        return Ok(());
    }

    {
        let mut map = buffer.map_writable().map_err(|_| FilterError::BufferMap)?;
        if mute {
            map.as_mut_slice().fill(0);
        } else {
            params
                .processor
                .process(map.as_mut_slice(), params.gain.volume);
        }
    }

    if mute {
        buffer.set_flags(gst::BufferFlags::GAP);
    }

    Ok(())
}
