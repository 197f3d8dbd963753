//! Push a PCM stream through a gain filter buffer by buffer

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::host::LoggingHost;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::{debug, info};
use volctl_filter::{
    ElementKind, GainFilter, GainProperties, LoudnessGain, TransformHost, VolumeGain,
};

/// Counters collected while streaming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub buffers: usize,
    pub bytes: usize,
    pub gap_buffers: usize,
}

/// Fill `buf` from `input`, stopping early only at end of stream
fn read_chunk<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Negotiate `info` with the filter and stream `input` to `output`
///
/// The caps query runs first, as a pipeline would before sending the format.
pub fn process_stream<P, H, R, W>(
    filter: &mut GainFilter<P>,
    host: &H,
    info: &gst_audio::AudioInfo,
    buffer_bytes: usize,
    mut input: R,
    mut output: W,
) -> Result<ProcessingStats>
where
    P: GainProperties,
    H: TransformHost + ?Sized,
    R: Read,
    W: Write,
{
    let mut query = gst::query::Caps::new(None);
    filter.control().sink_query(host, &mut query);
    let caps = query
        .result()
        .map(ToOwned::to_owned)
        .unwrap_or_else(gst::Caps::new_empty);
    if !info.to_caps()?.is_subset(&caps) {
        return Err(CliError::NotAccepted {
            element: P::FACTORY_NAME,
            caps: caps.to_string(),
        });
    }
    filter.setup(host, info)?;

    let mut stats = ProcessingStats::default();
    let mut chunk = vec![0u8; buffer_bytes.max(1)];
    loop {
        let n = read_chunk(&mut input, &mut chunk)?;
        if n == 0 {
            break;
        }

        let mut buffer = gst::Buffer::from_mut_slice(chunk[..n].to_vec());
        filter.chain(host, buffer.make_mut())?;

        if buffer.flags().contains(gst::BufferFlags::GAP) {
            stats.gap_buffers += 1;
        }
        stats.buffers += 1;
        stats.bytes += n;
        output.write_all(buffer.map_readable()?.as_slice())?;
    }
    output.flush()?;

    debug!(?stats, "stream finished");
    Ok(stats)
}

fn open_streams(input: &Path, output: &Path) -> Result<(BufReader<File>, BufWriter<File>)> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    Ok((reader, writer))
}

/// Run the configured element over `input`, writing the result to `output`
pub fn process_file(config: &CliConfig, input: &Path, output: &Path) -> Result<ProcessingStats> {
    gst::init()?;
    let info = config.audio_info()?;
    let buffer_bytes = config.buffer_bytes()?;
    let kind = config.element_kind()?;
    info!(
        element = kind.factory_name(),
        format = %info.format(),
        rate = info.rate(),
        channels = info.channels(),
        "processing {}",
        input.display()
    );

    let (reader, writer) = open_streams(input, output)?;
    let host = LoggingHost::default();
    let stats = match kind {
        ElementKind::Volume => {
            let mut filter = VolumeGain::new();
            filter.control().set_volume(&host, config.volume)?;
            process_stream(&mut filter, &host, &info, buffer_bytes, reader, writer)?
        }
        ElementKind::Ebur128Control => {
            let mut filter = LoudnessGain::new();
            let control = filter.control();
            control.set_integrated_loudness(&host, config.integrated_loudness_lufs)?;
            control.set_target_level(&host, config.target_level_lufs)?;
            process_stream(&mut filter, &host, &info, buffer_bytes, reader, writer)?
        }
    };
    debug!(
        passthrough = host.is_passthrough(),
        reconfigure_requests = host.reconfigure_requests(),
        "host state after stream"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn f32_bytes(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    fn info(format: gst_audio::AudioFormat, channels: u32) -> gst_audio::AudioInfo {
        gst::init().unwrap();
        gst_audio::AudioInfo::builder(format, 48000, channels)
            .build()
            .unwrap()
    }

    #[test]
    fn test_stream_in_small_buffers() {
        let host = LoggingHost::default();
        let mut filter = VolumeGain::new();
        filter.control().set_volume(&host, 2.0).unwrap();
        let info = info(gst_audio::AUDIO_FORMAT_F32, 1);

        let input = f32_bytes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut output = Vec::new();
        let stats =
            process_stream(&mut filter, &host, &info, 8, Cursor::new(input), &mut output).unwrap();

        assert_eq!(stats.buffers, 3);
        assert_eq!(stats.bytes, 20);
        assert_eq!(output, f32_bytes(&[2.0, 4.0, 6.0, 8.0, 10.0]));
        assert!(!host.is_passthrough());
    }

    #[test]
    fn test_integer_stream_rejected_by_caps() {
        let host = LoggingHost::default();
        let mut filter = VolumeGain::new();
        filter.control().set_volume(&host, 0.5).unwrap();
        let info = info(gst_audio::AudioFormat::S16le, 2);

        let err = process_stream(
            &mut filter,
            &host,
            &info,
            64,
            Cursor::new(vec![0u8; 16]),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NotAccepted { .. }));
        assert_eq!(host.reconfigure_requests(), 1);
    }

    #[test]
    fn test_integer_stream_passes_at_neutral_gain() {
        let host = LoggingHost::default();
        let mut filter = VolumeGain::new();
        let info = info(gst_audio::AudioFormat::S16le, 2);
        let input: Vec<u8> = (0..32).collect();

        let mut output = Vec::new();
        process_stream(
            &mut filter,
            &host,
            &info,
            16,
            Cursor::new(input.clone()),
            &mut output,
        )
        .unwrap();
        assert_eq!(output, input);
        assert!(host.is_passthrough());
    }

    #[test]
    fn test_mute_counts_gap_buffers() {
        let host = LoggingHost::default();
        let mut filter = VolumeGain::new();
        filter.control().set_volume(&host, 0.0).unwrap();
        let info = info(gst_audio::AUDIO_FORMAT_F32, 2);

        let mut output = Vec::new();
        let stats = process_stream(
            &mut filter,
            &host,
            &info,
            16,
            Cursor::new(f32_bytes(&[0.5; 8])),
            &mut output,
        )
        .unwrap();
        assert_eq!(stats.gap_buffers, 2);
        assert!(output.iter().all(|&b| b == 0));
    }
}
