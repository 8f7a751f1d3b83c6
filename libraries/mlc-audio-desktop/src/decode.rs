//! Whole-clip decoding and conversion to the output device layout
//!
//! Soundboard clips are short, so each one is decoded in full on first play
//! and kept in memory as interleaved `f32` at the device's rate and channel
//! count.

use crate::error::{DesktopAudioError, Result};
use bytes::Bytes;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded clip, interleaved
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedClip {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / usize::from(self.channels)
        }
    }
}

/// File extension of a URL's last path segment, used as a probe hint
pub fn extension_hint(source_url: &str) -> Option<String> {
    let url = url::Url::parse(source_url).ok()?;
    let segment = url.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Decode a complete clip held in memory
///
/// Packets that fail to decode are skipped; a clip with no decodable audio
/// is an error.
pub fn decode_clip(bytes: Bytes, extension: Option<&str>) -> Result<DecodedClip> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DesktopAudioError::Decode(format!("Failed to probe clip: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| DesktopAudioError::Decode("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DesktopAudioError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(symphonia::core::errors::Error::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                warn!(error = %e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if samples.is_empty() || channels == 0 {
        return Err(DesktopAudioError::Decode(
            "Clip contains no audio".to_string(),
        ));
    }

    debug!(
        samples = samples.len(),
        sample_rate,
        channels,
        "Decoded clip"
    );

    Ok(DecodedClip {
        samples,
        sample_rate,
        channels,
    })
}

/// Convert a clip to the device's channel count and sample rate
///
/// Channel mapping is direct: mono is copied to every output channel, extra
/// source channels are dropped, and missing ones are silent. A mono device
/// gets the average of all source channels.
pub fn convert_for_device(
    clip: &DecodedClip,
    device_channels: u16,
    device_rate: u32,
) -> Result<Vec<f32>> {
    let mapped = map_channels(clip, device_channels);

    if clip.sample_rate == device_rate || mapped.is_empty() {
        return Ok(mapped);
    }

    resample(&mapped, device_channels, clip.sample_rate, device_rate)
}

fn map_channels(clip: &DecodedClip, target: u16) -> Vec<f32> {
    let source = usize::from(clip.channels);
    let target = usize::from(target);

    if source == target {
        return clip.samples.clone();
    }

    let mut out = Vec::with_capacity(clip.frames() * target);
    for frame in clip.samples.chunks_exact(source) {
        if target == 1 {
            out.push(frame.iter().sum::<f32>() / source as f32);
            continue;
        }
        for ch in 0..target {
            let sample = if source == 1 {
                frame[0]
            } else {
                frame.get(ch).copied().unwrap_or(0.0)
            };
            out.push(sample);
        }
    }
    out
}

fn resample(samples: &[f32], channels: u16, source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
        WindowFunction,
    };

    let channels = usize::from(channels);
    let frames = samples.len() / channels;

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        target_rate as f64 / source_rate as f64,
        2.0,
        params,
        frames,
        channels,
    )
    .map_err(|e| DesktopAudioError::Decode(format!("Resampler setup failed: {}", e)))?;

    let mut deinterleaved = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (ch, channel_vec) in deinterleaved.iter_mut().enumerate() {
            channel_vec.push(frame[ch]);
        }
    }

    let resampled = resampler
        .process(&deinterleaved, None)
        .map_err(|e| DesktopAudioError::Decode(format!("Resampling failed: {}", e)))?;

    let output_frames = resampled.first().map_or(0, Vec::len);
    let mut interleaved = Vec::with_capacity(output_frames * channels);
    for frame_idx in 0..output_frames {
        for channel_data in &resampled {
            interleaved.push(channel_data[frame_idx]);
        }
    }

    Ok(interleaved)
}
