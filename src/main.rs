// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CREASE - Coach Review And Stroke Editor
//!
//! A desktop review tool for short cricket practice clips: coaches draw on
//! and comment individual seconds of a video, students play it back with
//! the coach's annotations overlaid.

mod app;
mod config;
mod identity;
mod io;
mod models;
mod session;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::ReviewApp;
use clap::Parser;
use config::SessionConfig;
use identity::{Identity, Role, StaticIdentity};
use io::feedback::{FeedbackEndpoint, HttpFeedbackEndpoint};
use io::media::VideoSource;
use io::store::{FileStore, KeyValueStore, MemoryStore};
use session::FrameAnnotationSession;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "crease", version, about = "Per-second annotation of cricket practice clips")]
struct Args {
    /// Identifier of the video under review
    #[arg(long)]
    video_id: String,

    /// Video file to review (requires the video-opencv feature)
    #[arg(long)]
    video: Option<PathBuf>,

    /// Still image shown in place of video frames
    #[arg(long)]
    poster: Option<PathBuf>,

    /// Clip duration in seconds when no video file is decoded
    #[arg(long, default_value_t = 5.0)]
    duration: f64,

    /// Who is reviewing: coach or student
    #[arg(long, default_value = "coach")]
    role: Role,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Review file (JSON or YAML) to load annotations from
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Reload the last local checkpoint for this video
    #[arg(long)]
    restore: bool,

    /// Override the maximum number of reviewable seconds
    #[arg(long)]
    max_seconds: Option<u32>,
}

fn open_video(args: &Args) -> Result<Box<dyn VideoSource>> {
    #[cfg(feature = "video-opencv")]
    {
        if let Some(ref path) = args.video {
            return Ok(Box::new(io::media::OpenCvVideoSource::open(path)?));
        }
    }
    #[cfg(not(feature = "video-opencv"))]
    {
        if let Some(ref path) = args.video {
            log::warn!(
                "Ignoring {}: built without video-opencv, using a {:.1}s clock instead",
                path.display(),
                args.duration
            );
        }
    }

    let poster = match args.poster {
        Some(ref path) => Some(io::media::load_image(path)?),
        None => None,
    };
    Ok(Box::new(io::media::ClockVideoSource::new(args.duration, poster)))
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let mut config = match args.config {
        Some(ref path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(max) = args.max_seconds {
        config.max_review_seconds = max.max(1);
    }

    let role = StaticIdentity(args.role).current_user_role();
    let store = FileStore::new(&config.store_dir);
    let mut session = FrameAnnotationSession::open(&args.video_id, open_video(&args)?, config.max_review_seconds)
        .context("Failed to open review session")?;

    if let Some(ref path) = args.annotations {
        let review = io::serialization::import_review(path)?;
        if review.video_id != args.video_id {
            log::warn!(
                "Review file is for {} but reviewing {}",
                review.video_id,
                args.video_id
            );
        }
        session.load_annotations(review.annotations);
        log::info!("Loaded annotations from {}", path.display());
    } else if args.restore {
        match session.restore_checkpoint(&store) {
            Ok(true) => {}
            Ok(false) => log::info!("No checkpoint to restore for {}", args.video_id),
            Err(e) => log::warn!("Ignoring unreadable checkpoint: {}", e),
        }
    }

    let endpoint: Option<Arc<dyn FeedbackEndpoint + Sync>> = match config.endpoint {
        Some(ref endpoint) => Some(Arc::new(HttpFeedbackEndpoint::new(endpoint)?)),
        None => None,
    };

    // Students never write checkpoints.
    let store: Box<dyn KeyValueStore> = if role.can_annotate() {
        Box::new(store)
    } else {
        Box::new(MemoryStore::new())
    };

    let app = ReviewApp::new(
        session,
        role,
        store,
        endpoint,
        config.autosave_interval(),
        config.min_sample_distance,
    );

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title(format!("CREASE - {}", args.video_id)),
        ..Default::default()
    };

    // Run the application
    eframe::run_native("CREASE", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
