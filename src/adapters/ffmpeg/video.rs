use crate::error::{CapabilityError, FrameReadError, PipelineError};
use crate::ports::video::{VideoOpener, VideoSource};
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context, flag::Flags};
use ffmpeg::util::frame::video::Video;
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, info};

pub struct FfmpegVideoOpener;

impl FfmpegVideoOpener {
    pub fn new() -> Result<Self, CapabilityError> {
        ffmpeg::init().map_err(|e| CapabilityError::Unavailable(format!("libav: {}", e)))?;
        info!("Video decoder ready");
        Ok(Self)
    }
}

impl VideoOpener for FfmpegVideoOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, PipelineError> {
        let source = FfmpegVideoSource::open(path).map_err(|e| PipelineError::decode(path, e))?;
        debug!(frame_rate = source.frame_rate, "Video opened");
        Ok(Box::new(source))
    }
}

/// Forward-only decoder over the best video stream of a file.
pub struct FfmpegVideoSource {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: Context,
    stream_index: usize,
    frame_rate: f64,
    next_index: u64,
    flushed: bool,
}

impl FfmpegVideoSource {
    fn open(path: &Path) -> Result<Self, ffmpeg::Error> {
        let ictx = input(&path)?;
        let stream = ictx
            .streams()
            .best(Type::Video)
            .ok_or(ffmpeg::Error::StreamNotFound)?;
        let stream_index = stream.index();

        let rate = stream.avg_frame_rate();
        let frame_rate = if rate.denominator() == 0 {
            0.0
        } else {
            f64::from(rate)
        };

        let context_decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context_decoder.decoder().video()?;

        let scaler = Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            Flags::BILINEAR,
        )?;

        Ok(Self {
            input: ictx,
            decoder,
            scaler,
            stream_index,
            frame_rate,
            next_index: 0,
            flushed: false,
        })
    }

    /// Next decoded frame in presentation order, feeding packets as needed.
    fn receive(&mut self) -> Result<Option<Video>, ffmpeg::Error> {
        let mut decoded = Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.flushed {
                return Ok(None);
            }
            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                None => {
                    self.decoder.send_eof()?;
                    self.flushed = true;
                }
            }
        }
    }

    fn to_rgb(&mut self, decoded: &Video) -> Result<RgbImage, ffmpeg::Error> {
        let mut rgb_frame = Video::empty();
        self.scaler.run(decoded, &mut rgb_frame)?;

        let width = rgb_frame.width();
        let height = rgb_frame.height();
        let stride = rgb_frame.stride(0);
        let row_len = width as usize * 3;

        // Rows are padded to `stride` bytes.
        let data = rgb_frame.data(0);
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in data.chunks(stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        RgbImage::from_raw(width, height, pixels).ok_or(ffmpeg::Error::InvalidData)
    }
}

impl VideoSource for FfmpegVideoSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn read_at(&mut self, index: u64) -> Result<Option<RgbImage>, FrameReadError> {
        let read_error = |reason: String| FrameReadError { index, reason };

        if index < self.next_index {
            return Err(read_error(format!(
                "frame already consumed (next is {})",
                self.next_index
            )));
        }

        loop {
            let decoded = match self.receive().map_err(|e| read_error(e.to_string()))? {
                Some(decoded) => decoded,
                None => return Ok(None),
            };
            let current = self.next_index;
            self.next_index += 1;

            if current == index {
                return self
                    .to_rgb(&decoded)
                    .map(Some)
                    .map_err(|e| read_error(e.to_string()));
            }
        }
    }
}
