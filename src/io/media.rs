// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media loading and video sources.
//!
//! This module handles loading poster images and driving video playback,
//! converting frames to RGBA buffers suitable for display in egui.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// Errors raised by a video source.
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("Seek to {0}s failed: {1}")]
    Seek(u32, String),

    #[error("Video backend error: {0}")]
    Backend(String),
}

/// Decoded RGBA image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load an image file into an RGBA buffer.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Playback collaborator driven by the annotation session and the host.
pub trait VideoSource {
    /// Clip length in seconds, once media is loaded.
    fn duration_seconds(&self) -> Option<f64>;

    /// Jump to `second` and stop playback.
    fn seek_and_pause(&mut self, second: u32) -> Result<(), VideoError>;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Current playback position in seconds.
    fn position_seconds(&self) -> f64;

    /// Frame to display at the current position, if the source has one.
    fn current_frame(&mut self) -> Option<&LoadedImage>;
}

/// Wall-clock playback over a still poster image.
///
/// Used when no video decoder is compiled in: position advances in real
/// time while playing and stops at the end of the clip.
pub struct ClockVideoSource {
    duration: f64,
    position: f64,
    playing_since: Option<Instant>,
    poster: Option<LoadedImage>,
}

impl ClockVideoSource {
    pub fn new(duration: f64, poster: Option<LoadedImage>) -> Self {
        Self {
            duration,
            position: 0.0,
            playing_since: None,
            poster,
        }
    }
}

impl VideoSource for ClockVideoSource {
    fn duration_seconds(&self) -> Option<f64> {
        (self.duration.is_finite() && self.duration > 0.0).then_some(self.duration)
    }

    fn seek_and_pause(&mut self, second: u32) -> Result<(), VideoError> {
        let target = second as f64;
        if target > self.duration {
            return Err(VideoError::Seek(second, "beyond end of clip".to_string()));
        }
        self.playing_since = None;
        self.position = target;
        Ok(())
    }

    fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        let position = self.position_seconds();
        // Restart from the top once the clip has run out.
        self.position = if position >= self.duration { 0.0 } else { position };
        self.playing_since = Some(Instant::now());
    }

    fn pause(&mut self) {
        self.position = self.position_seconds();
        self.playing_since = None;
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && self.position_seconds() < self.duration
    }

    fn position_seconds(&self) -> f64 {
        match self.playing_since {
            Some(start) => (self.position + start.elapsed().as_secs_f64()).min(self.duration),
            None => self.position,
        }
    }

    fn current_frame(&mut self) -> Option<&LoadedImage> {
        self.poster.as_ref()
    }
}

#[cfg(feature = "video-opencv")]
pub use opencv_source::OpenCvVideoSource;

#[cfg(feature = "video-opencv")]
mod opencv_source {
    use super::{LoadedImage, VideoError, VideoSource};
    use anyhow::{bail, Result};
    use opencv::{core::Mat, imgproc, prelude::*, videoio};
    use std::path::Path;
    use std::time::Instant;

    /// Video file decoded through OpenCV.
    pub struct OpenCvVideoSource {
        capture: videoio::VideoCapture,
        duration: Option<f64>,
        position: f64,
        playing_since: Option<Instant>,
        frame: Option<LoadedImage>,
        frame_position: Option<f64>,
    }

    impl OpenCvVideoSource {
        pub fn open(path: &Path) -> Result<Self> {
            let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                bail!("Could not open video {}", path.display());
            }

            let fps = capture.get(videoio::CAP_PROP_FPS)?;
            let frames = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
            let duration = (fps > 0.0 && frames > 0.0).then(|| frames / fps);
            log::info!("Opened video {} ({:?}s at {:.2} fps)", path.display(), duration, fps);

            Ok(Self {
                capture,
                duration,
                position: 0.0,
                playing_since: None,
                frame: None,
                frame_position: None,
            })
        }

        fn decode_at(&mut self, seconds: f64) -> opencv::Result<()> {
            self.capture.set(videoio::CAP_PROP_POS_MSEC, seconds * 1000.0)?;
            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                return Ok(());
            }
            let mut rgba = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
            let size = rgba.size()?;
            self.frame = Some(LoadedImage {
                width: size.width as u32,
                height: size.height as u32,
                pixels: rgba.data_bytes()?.to_vec(),
            });
            self.frame_position = Some(seconds);
            Ok(())
        }
    }

    impl VideoSource for OpenCvVideoSource {
        fn duration_seconds(&self) -> Option<f64> {
            self.duration
        }

        fn seek_and_pause(&mut self, second: u32) -> Result<(), VideoError> {
            self.playing_since = None;
            self.position = second as f64;
            self.decode_at(self.position)
                .map_err(|e| VideoError::Seek(second, e.to_string()))
        }

        fn play(&mut self) {
            if self.is_playing() {
                return;
            }
            let position = self.position_seconds();
            self.position = match self.duration {
                Some(d) if position >= d => 0.0,
                _ => position,
            };
            self.playing_since = Some(Instant::now());
        }

        fn pause(&mut self) {
            self.position = self.position_seconds();
            self.playing_since = None;
        }

        fn is_playing(&self) -> bool {
            self.playing_since.is_some()
                && self.duration.map_or(true, |d| self.position_seconds() < d)
        }

        fn position_seconds(&self) -> f64 {
            let position = match self.playing_since {
                Some(start) => self.position + start.elapsed().as_secs_f64(),
                None => self.position,
            };
            self.duration.map_or(position, |d| position.min(d))
        }

        fn current_frame(&mut self) -> Option<&LoadedImage> {
            // Re-decode at most ~25 times a second of playback.
            let position = self.position_seconds();
            let stale = self
                .frame_position
                .map_or(true, |decoded| (decoded - position).abs() >= 0.04);
            if stale {
                if let Err(e) = self.decode_at(position) {
                    log::warn!("Failed to decode frame at {:.2}s: {}", position, e);
                }
            }
            self.frame.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_source_seek_pauses() {
        let mut source = ClockVideoSource::new(5.0, None);
        source.play();
        assert!(source.is_playing());

        source.seek_and_pause(3).unwrap();
        assert!(!source.is_playing());
        assert_eq!(source.position_seconds(), 3.0);
    }

    #[test]
    fn test_clock_source_replays_from_start_after_end() {
        let mut source = ClockVideoSource::new(2.0, None);
        source.seek_and_pause(2).unwrap();
        source.play();
        assert!(source.is_playing());
        assert!(source.position_seconds() < 1.0);
    }

    #[test]
    fn test_clock_source_rejects_seek_past_end() {
        let mut source = ClockVideoSource::new(2.5, None);
        assert!(source.seek_and_pause(2).is_ok());
        assert!(matches!(source.seek_and_pause(3), Err(VideoError::Seek(3, _))));
        assert_eq!(source.position_seconds(), 2.0);
    }

    #[test]
    fn test_clock_source_duration_requires_positive_length() {
        assert_eq!(ClockVideoSource::new(4.2, None).duration_seconds(), Some(4.2));
        assert_eq!(ClockVideoSource::new(0.0, None).duration_seconds(), None);
        assert_eq!(ClockVideoSource::new(f64::NAN, None).duration_seconds(), None);
    }
}
