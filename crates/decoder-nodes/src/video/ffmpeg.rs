//! FFmpeg video backend (ac-ffmpeg)
//!
//! Demuxes the payload from memory, decodes every video stream and converts
//! each frame to packed RGB24 with the frame scaler. Demuxer, decoders and
//! scalers live for a single call.

use super::backend::{DecodedStream, VideoCodecBackend, NO_PTS};
use ac_ffmpeg::codec::video::{frame::get_pixel_format, VideoDecoder, VideoFrame, VideoFrameScaler};
use ac_ffmpeg::codec::Decoder;
use ac_ffmpeg::format::demuxer::Demuxer;
use ac_ffmpeg::format::io::IO;
use ac_ffmpeg::time::Timestamp;
use ndarray::Array4;
use pixelfeed_core::{Error, MemoryBlock, Result};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

fn ffmpeg_error(context: &str, err: ac_ffmpeg::Error) -> Error {
    Error::decode("ffmpeg", format!("{}: {}", context, err))
}

fn frame_timestamp(pts: Timestamp) -> i64 {
    if pts.is_null() {
        NO_PTS
    } else {
        pts.timestamp()
    }
}

/// Decoding state of one video stream
struct StreamState {
    decoder: VideoDecoder,
    scaler: Option<VideoFrameScaler>,
    width: usize,
    height: usize,
    samples: Vec<u8>,
    pts: Vec<i64>,
}

impl StreamState {
    fn new(decoder: VideoDecoder) -> Self {
        Self {
            decoder,
            scaler: None,
            width: 0,
            height: 0,
            samples: Vec::new(),
            pts: Vec::new(),
        }
    }

    /// Drain every frame the decoder has ready
    fn drain(&mut self) -> Result<()> {
        while let Some(frame) = self.decoder.take().map_err(|e| ffmpeg_error("take frame", e))? {
            self.push_frame(&frame)?;
        }
        Ok(())
    }

    fn push_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        if self.scaler.is_none() {
            self.width = frame.width();
            self.height = frame.height();
            let scaler = VideoFrameScaler::builder()
                .source_pixel_format(frame.pixel_format())
                .source_width(self.width)
                .source_height(self.height)
                .target_pixel_format(get_pixel_format("rgb24"))
                .target_width(self.width)
                .target_height(self.height)
                .build()
                .map_err(|e| ffmpeg_error("create scaler", e))?;
            self.scaler = Some(scaler);
        }

        if frame.width() != self.width || frame.height() != self.height {
            return Err(Error::decode(
                "ffmpeg",
                format!(
                    "frame size changed mid-stream from {}x{} to {}x{}",
                    self.width,
                    self.height,
                    frame.width(),
                    frame.height()
                ),
            ));
        }

        let rgb = match self.scaler.as_mut() {
            Some(scaler) => scaler.scale(frame).map_err(|e| ffmpeg_error("scale frame", e))?,
            None => return Err(Error::decode("ffmpeg", "scaler not initialized")),
        };

        // Rows may be padded; copy only the visible width.
        let planes = rgb.planes();
        let plane = &planes[0];
        let line_size = plane.line_size();
        let row_bytes = self.width * 3;
        let data = plane.data();
        for row in 0..self.height {
            let start = row * line_size;
            self.samples.extend_from_slice(&data[start..start + row_bytes]);
        }

        self.pts.push(frame_timestamp(frame.pts()));
        Ok(())
    }

    fn finish(self, stream_index: usize) -> Result<DecodedStream> {
        let num_frames = self.pts.len();
        let frames = Array4::from_shape_vec((num_frames, self.height, self.width, 3), self.samples)
            .map_err(|e| Error::decode("ffmpeg", e.to_string()))?;
        Ok(DecodedStream {
            stream_index,
            width: self.width,
            height: self.height,
            frames,
            pts: self.pts,
        })
    }
}

/// Decodes containers through the FFmpeg libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl VideoCodecBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn decode(&self, payload: &MemoryBlock) -> Result<Vec<DecodedStream>> {
        let io = IO::from_seekable_read_stream(Cursor::new(payload.clone().into_bytes()));

        let mut demuxer = Demuxer::builder()
            .build(io)
            .map_err(|e| ffmpeg_error("open container", e))?
            .find_stream_info(None)
            .map_err(|(_, e)| ffmpeg_error("find stream info", e))?;

        let mut states = BTreeMap::new();
        for (index, stream) in demuxer.streams().iter().enumerate() {
            if !stream.codec_parameters().is_video_codec() {
                continue;
            }
            let decoder = VideoDecoder::from_stream(stream)
                .map_err(|e| ffmpeg_error("create decoder", e))?
                .build()
                .map_err(|e| ffmpeg_error("build decoder", e))?;
            states.insert(index, StreamState::new(decoder));
        }

        if states.is_empty() {
            return Err(Error::decode("ffmpeg", "container has no video stream"));
        }

        while let Some(packet) = demuxer.take().map_err(|e| ffmpeg_error("read packet", e))? {
            if let Some(state) = states.get_mut(&packet.stream_index()) {
                state
                    .decoder
                    .push(packet)
                    .map_err(|e| ffmpeg_error("push packet", e))?;
                state.drain()?;
            }
        }

        let mut decoded = Vec::with_capacity(states.len());
        for (index, mut state) in states {
            state.decoder.flush().map_err(|e| ffmpeg_error("flush decoder", e))?;
            state.drain()?;
            debug!(stream = index, frames = state.pts.len(), "Decoded video stream");
            decoded.push(state.finish(index)?);
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_ffmpeg::codec::video::{self, VideoEncoder as FfmpegEncoder, VideoFrameMut};
    use ac_ffmpeg::codec::{CodecParameters, Encoder};
    use ac_ffmpeg::format::muxer::{Muxer, OutputFormat};
    use ac_ffmpeg::time::TimeBase;

    // Not a multiple of the scaler's row alignment, so RGB rows are padded.
    const WIDTH: usize = 34;
    const HEIGHT: usize = 18;
    const LUMA: u8 = 180;

    /// Encode `frames` flat gray frames as MPEG-4 part 2 in a NUT container
    fn encode_gray_video(frames: i64) -> MemoryBlock {
        let time_base = TimeBase::new(1, 25);
        let pixel_format = video::frame::get_pixel_format("yuv420p");

        let mut encoder = FfmpegEncoder::builder("mpeg4")
            .unwrap()
            .pixel_format(pixel_format)
            .width(WIDTH)
            .height(HEIGHT)
            .time_base(time_base)
            .build()
            .unwrap();

        let codec_parameters: CodecParameters = encoder.codec_parameters().into();
        let mut muxer_builder = Muxer::builder();
        muxer_builder.add_stream(&codec_parameters).unwrap();
        let output_format = OutputFormat::find_by_name("nut").unwrap();
        let io = IO::from_seekable_write_stream(Cursor::new(Vec::new()));
        let mut muxer = muxer_builder.build(io, output_format).unwrap();

        let mut gray = VideoFrameMut::black(pixel_format, WIDTH, HEIGHT);
        gray.planes_mut()[0].data_mut().fill(LUMA);
        let gray = gray.with_time_base(time_base).freeze();

        for index in 0..frames {
            encoder
                .push(gray.clone().with_pts(Timestamp::new(index, time_base)))
                .unwrap();
            while let Some(packet) = encoder.take().unwrap() {
                muxer.push(packet.with_stream_index(0)).unwrap();
            }
        }
        encoder.flush().unwrap();
        while let Some(packet) = encoder.take().unwrap() {
            muxer.push(packet.with_stream_index(0)).unwrap();
        }
        muxer.flush().unwrap();

        let io = muxer.close().unwrap();
        MemoryBlock::from(io.into_stream().into_inner())
    }

    #[test]
    fn test_decodes_encoded_frames() {
        let streams = FfmpegBackend.decode(&encode_gray_video(5)).unwrap();
        assert_eq!(streams.len(), 1);

        let stream = &streams[0];
        assert_eq!(stream.stream_index, 0);
        assert_eq!((stream.width, stream.height), (WIDTH, HEIGHT));
        assert_eq!(stream.frames.shape(), &[5, HEIGHT, WIDTH, 3]);
        assert_eq!(stream.num_frames(), 5);

        assert_eq!(stream.pts.len(), 5);
        assert!(stream.pts.iter().all(|&pts| pts != NO_PTS));
        assert!(stream.pts.windows(2).all(|pair| pair[0] < pair[1]));

        // Limited-range luma 180 with neutral chroma is a gray near 191.
        for frame in 0..5 {
            for channel in 0..3 {
                let sample = stream.frames[[frame, HEIGHT / 2, WIDTH - 1, channel]];
                assert!((170..=210).contains(&sample), "sample {} out of range", sample);
            }
        }
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = FfmpegBackend
            .decode(&MemoryBlock::from(vec![0u8; 10]))
            .unwrap_err();
        assert!(err.is_decode(), "unexpected error: {}", err);
    }

    #[test]
    fn test_missing_timestamp_maps_to_sentinel() {
        assert_eq!(frame_timestamp(Timestamp::null()), NO_PTS);
        assert_eq!(frame_timestamp(Timestamp::new(40, TimeBase::new(1, 1000))), 40);
    }
}
