//! Video codec backend abstractions
//!
//! A backend turns an encoded container into packed RGB frames per video
//! stream. Primary backend: ac-ffmpeg (FFmpeg bindings, `ffmpeg` feature).
//! Without it the [`ContainerSniffer`] still classifies the payload so that
//! garbage fails as a decode error and real video as not supported.

use ndarray::Array4;
use pixelfeed_core::{Error, MemoryBlock, Result};
use std::fmt;
use std::sync::Arc;

/// `frame_pts` value of a frame the container gave no timestamp
pub const NO_PTS: i64 = i64::MIN;

/// All frames of one decoded video stream
#[derive(Debug, Clone)]
pub struct DecodedStream {
    /// Index of the stream within the container
    pub stream_index: usize,
    pub width: usize,
    pub height: usize,
    /// Packed RGB24 samples, `[num_frames, height, width, 3]`
    pub frames: Array4<u8>,
    /// Presentation timestamp of each frame in stream time-base units, or
    /// [`NO_PTS`] when the frame carried none
    pub pts: Vec<i64>,
}

impl DecodedStream {
    pub fn num_frames(&self) -> usize {
        self.frames.shape()[0]
    }
}

/// Video decoder backend trait
///
/// Implementations must not keep per-call state; one backend instance is
/// shared by every call of a decoder.
pub trait VideoCodecBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Decode every video stream in `payload`
    ///
    /// # Returns
    /// * `Ok(streams)` - One entry per video stream
    /// * `Err(Error::Decode)` - Corrupt or unrecognized payload
    /// * `Err(Error::NotSupported)` - Payload recognized but not decodable by this build
    fn decode(&self, payload: &MemoryBlock) -> Result<Vec<DecodedStream>>;
}

/// MPEG transport stream packet size
const TS_PACKET_SIZE: usize = 188;

/// Container formats recognized from their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// ISO base media (MP4, MOV, 3GP)
    Mp4,
    /// Matroska and WebM
    Matroska,
    Avi,
    Flv,
    Ogg,
    MpegTs,
}

impl ContainerFormat {
    /// Identify the container from its signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= 12 && matches!(&bytes[4..8], b"ftyp" | b"moov" | b"mdat") {
            return Some(Self::Mp4);
        }
        if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(Self::Matroska);
        }
        if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"AVI " {
            return Some(Self::Avi);
        }
        if bytes.len() >= 4 && bytes.starts_with(b"FLV") && bytes[3] == 1 {
            return Some(Self::Flv);
        }
        if bytes.starts_with(b"OggS") {
            return Some(Self::Ogg);
        }
        if bytes.len() > TS_PACKET_SIZE && bytes[0] == 0x47 && bytes[TS_PACKET_SIZE] == 0x47 {
            return Some(Self::MpegTs);
        }
        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Matroska => "matroska",
            Self::Avi => "avi",
            Self::Flv => "flv",
            Self::Ogg => "ogg",
            Self::MpegTs => "mpegts",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend used when no video codec is compiled in
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerSniffer;

impl VideoCodecBackend for ContainerSniffer {
    fn name(&self) -> &str {
        "sniffer"
    }

    fn decode(&self, payload: &MemoryBlock) -> Result<Vec<DecodedStream>> {
        match ContainerFormat::sniff(payload.as_slice()) {
            Some(format) => Err(Error::not_supported(format!(
                "{} container recognized but no video codec is compiled in (enable the `ffmpeg` feature)",
                format
            ))),
            None => Err(Error::decode(
                "video",
                format!("unrecognized container ({} bytes)", payload.len()),
            )),
        }
    }
}

/// The best backend this build offers
#[cfg(feature = "ffmpeg")]
pub fn default_backend() -> Arc<dyn VideoCodecBackend> {
    Arc::new(super::ffmpeg::FfmpegBackend)
}

#[cfg(not(feature = "ffmpeg"))]
pub fn default_backend() -> Arc<dyn VideoCodecBackend> {
    Arc::new(ContainerSniffer)
}
