// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module hosts one annotation session inside an eframe window. It
//! routes panel actions to the session, drives the autosave timer, runs
//! feedback submission on a background thread, and guards window close
//! with a save/discard/cancel prompt.

use crate::identity::Role;
use crate::io::feedback::{spawn_submission, FeedbackEndpoint, PendingSubmission, SubmitError};
use crate::io::serialization;
use crate::io::store::KeyValueStore;
use crate::session::autosave::AutosaveTimer;
use crate::session::{navigator, ExitChoice, ExitDecision, ExitOutcome, FrameAnnotationSession};
use crate::ui::{canvas, comment, timeline, toolbar};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main application state.
pub struct ReviewApp {
    session: FrameAnnotationSession,
    role: Role,
    input: canvas::PointerInput,
    store: Box<dyn KeyValueStore>,
    endpoint: Option<Arc<dyn FeedbackEndpoint + Sync>>,
    autosave: AutosaveTimer,

    /// Uploaded video frame and the position it was decoded at.
    frame_texture: Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    texture_position: Option<f64>,

    /// Submission running on a worker thread.
    pending: Option<PendingSubmission>,
    /// Close the window once the pending submission succeeds.
    exit_after_submit: bool,
    /// Close requests are let through once exit has been resolved.
    allow_close: bool,
    status: Option<String>,
}

impl ReviewApp {
    pub fn new(
        session: FrameAnnotationSession,
        role: Role,
        store: Box<dyn KeyValueStore>,
        endpoint: Option<Arc<dyn FeedbackEndpoint + Sync>>,
        autosave_interval: Duration,
        min_sample_distance: f64,
    ) -> Self {
        Self {
            session,
            role,
            input: canvas::PointerInput::new(min_sample_distance),
            store,
            endpoint,
            autosave: AutosaveTimer::new(autosave_interval, Instant::now()),
            frame_texture: None,
            frame_size: None,
            texture_position: None,
            pending: None,
            exit_after_submit: false,
            allow_close: false,
            status: None,
        }
    }

    /// Commit the current frame and hand a snapshot to the endpoint.
    fn start_submission(&mut self, exit_after: bool) {
        if self.pending.is_some() {
            return;
        }
        let Some(endpoint) = self.endpoint.clone() else {
            self.report_submit_error(&SubmitError::NotConfigured);
            return;
        };
        let submission = self.session.prepare_submission();
        log::info!("Submitting feedback for {}", submission.video_id);
        self.pending = Some(spawn_submission(endpoint, submission));
        self.exit_after_submit = exit_after;
        self.status = Some("Submitting feedback...".to_string());
    }

    /// Collect a finished submission. Returns true when the window should close.
    fn poll_submission(&mut self) -> bool {
        let Some(result) = self.pending.as_ref().and_then(PendingSubmission::poll) else {
            return false;
        };
        let Some(pending) = self.pending.take() else {
            return false;
        };
        self.session.complete_submission(pending.revision, &result);
        let exit_after = std::mem::take(&mut self.exit_after_submit);
        let may_exit = self.session.may_exit_after_submission(&result);

        match result {
            Ok(_) if exit_after && !may_exit => {
                log::info!("Annotations changed while submitting, staying open");
                self.status = Some("Feedback submitted, newer changes are unsaved".to_string());
                false
            }
            Ok(_) => {
                self.status = Some("Feedback submitted".to_string());
                exit_after
            }
            Err(e) => {
                if self.report_submit_error(&e) {
                    self.start_submission(exit_after);
                }
                false
            }
        }
    }

    /// Show a submission failure and ask whether to retry.
    fn report_submit_error(&mut self, error: &SubmitError) -> bool {
        log::error!("Feedback submission failed: {}", error);
        self.status = Some(format!("Submission failed: {}", error));
        if matches!(error, SubmitError::NotConfigured) {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Cannot submit feedback")
                .set_description("No feedback endpoint is configured.")
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            return false;
        }
        let answer = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title("Submission failed")
            .set_description(format!("{}\n\nYour annotations are still here. Retry now?", error))
            .set_buttons(rfd::MessageButtons::OkCancel)
            .show();
        matches!(answer, rfd::MessageDialogResult::Ok | rfd::MessageDialogResult::Yes)
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.allow_close = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    /// Intercept window close while there are unsaved changes.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.allow_close {
            return;
        }
        if !self.role.can_annotate() || self.session.request_exit() == ExitDecision::Allowed {
            self.allow_close = true;
            return;
        }

        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        if self.pending.is_some() {
            self.exit_after_submit = true;
            return;
        }

        let answer = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Unsaved annotations")
            .set_description("Submit your feedback before closing?")
            .set_buttons(rfd::MessageButtons::YesNoCancel)
            .show();
        let choice = match answer {
            rfd::MessageDialogResult::Yes => ExitChoice::SaveAndExit,
            rfd::MessageDialogResult::No => ExitChoice::DiscardAndExit,
            _ => ExitChoice::Cancel,
        };
        match self.session.resolve_exit(choice, self.store.as_mut()) {
            // Submission runs in the background; the window closes once it succeeds.
            ExitOutcome::SubmitThenExit => self.start_submission(true),
            ExitOutcome::Exit => self.close(ctx),
            ExitOutcome::Stay => log::info!("Close cancelled"),
        }
    }

    fn run_autosave(&mut self) {
        if self.role.can_annotate() && self.autosave.poll(Instant::now()) {
            self.session.autosave(self.store.as_mut());
        }
    }

    /// Upload the current video frame when the playback position moved.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let position = self.session.video().position_seconds();
        if self.texture_position == Some(position) {
            return;
        }
        if let Some(frame) = self.session.video_mut().current_frame() {
            let size = [frame.width as usize, frame.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
            match self.frame_texture {
                Some(ref mut texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
                None => {
                    self.frame_texture =
                        Some(ctx.load_texture("video_frame", color_image, egui::TextureOptions::LINEAR));
                }
            }
            self.frame_size = Some((frame.width, frame.height));
        }
        self.texture_position = Some(position);
    }

    fn export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .add_filter("YAML", &["yaml", "yml"])
            .set_file_name("review.json")
            .save_file()
        else {
            return;
        };
        match serialization::export_review(&self.session.review_data(), &path) {
            Ok(()) => {
                log::info!("Exported review to {}", path.display());
                self.status = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export review: {}", e);
                self.status = Some(format!("Export failed: {}", e));
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.input.pointer_cancel(&mut self.session);
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z)) {
            self.session.undo_last_stroke();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            navigator::previous(&mut self.session);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            navigator::next(&mut self.session);
        }
    }
}

impl eframe::App for ReviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let coach = self.role.can_annotate();

        if self.poll_submission() {
            self.close(ctx);
        }
        self.run_autosave();
        self.handle_close_request(ctx);
        self.refresh_texture(ctx);

        if self.pending.is_some() || self.session.video().is_playing() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        if coach {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                let action = toolbar::show(ui, &mut self.session, self.pending.is_some());
                match action {
                    toolbar::ToolbarAction::Undo => {
                        self.session.undo_last_stroke();
                    }
                    toolbar::ToolbarAction::SaveFrame => {
                        self.session.save_current_frame();
                        self.status = Some(format!("Saved second {}", self.session.current_second()));
                    }
                    toolbar::ToolbarAction::Submit => self.start_submission(false),
                    toolbar::ToolbarAction::Export => self.export(),
                    toolbar::ToolbarAction::None => {}
                }
            });
        }

        egui::TopBottomPanel::bottom("timeline").show(ctx, |ui| {
            let indicators = navigator::indicators(&self.session);
            let playing = self.session.video().is_playing();
            match timeline::show(ui, &indicators, coach, playing) {
                timeline::TimelineAction::Previous => {
                    navigator::previous(&mut self.session);
                }
                timeline::TimelineAction::Next => {
                    navigator::next(&mut self.session);
                }
                timeline::TimelineAction::Jump(second) => {
                    navigator::jump(&mut self.session, second);
                }
                timeline::TimelineAction::TogglePlayback => {
                    let video = self.session.video_mut();
                    if playing {
                        video.pause();
                    } else {
                        video.play();
                    }
                }
                timeline::TimelineAction::None => {}
            }
        });

        egui::SidePanel::right("comment")
            .default_width(260.0)
            .show(ctx, |ui| {
                comment::show(ui, &mut self.session, coach, self.status.as_deref());
            });

        if coach {
            self.handle_keyboard(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            canvas::show(
                ui,
                &mut self.session,
                &mut self.input,
                &self.frame_texture,
                self.frame_size,
                coach,
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::feedback::Receipt;
    use crate::io::store::MemoryStore;
    use crate::models::annotation::Point;
    use crate::session::tests::session_with;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;

    /// Endpoint that answers only once the test releases it.
    struct GatedEndpoint {
        release: Mutex<Receiver<()>>,
    }

    impl FeedbackEndpoint for GatedEndpoint {
        fn submit(&self, _video_id: &str, _comment: &str, _annotations: &str) -> Result<Receipt, SubmitError> {
            self.release.lock().unwrap().recv().unwrap();
            Ok(Receipt {
                status: 200,
                body: String::new(),
            })
        }
    }

    fn gated_app() -> (ReviewApp, Sender<()>) {
        let (sender, receiver) = channel();
        let endpoint = Arc::new(GatedEndpoint {
            release: Mutex::new(receiver),
        });
        let (session, _) = session_with(5.0, 5);
        let app = ReviewApp::new(
            session,
            Role::Coach,
            Box::new(MemoryStore::new()),
            Some(endpoint as Arc<dyn FeedbackEndpoint + Sync>),
            Duration::from_secs(10),
            1.5,
        );
        (app, sender)
    }

    fn draw(app: &mut ReviewApp, x: f64) {
        app.session.begin_stroke(Point::new(x, x));
        app.session.commit_stroke();
    }

    /// Poll until the pending submission finishes; returns whether to close.
    fn finish_submission(app: &mut ReviewApp) -> bool {
        for _ in 0..1000 {
            let close = app.poll_submission();
            if app.pending.is_none() {
                return close;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("submission did not finish");
    }

    #[test]
    fn test_submit_and_exit_closes_when_nothing_changed() {
        let (mut app, release) = gated_app();
        draw(&mut app, 1.0);
        app.start_submission(true);
        assert!(app.pending.is_some());

        release.send(()).unwrap();
        assert!(finish_submission(&mut app));
        assert!(!app.session.has_unsaved_changes());
    }

    #[test]
    fn test_edits_during_submit_and_exit_keep_window_open() {
        let (mut app, release) = gated_app();
        draw(&mut app, 1.0);
        app.start_submission(true);
        draw(&mut app, 2.0);

        release.send(()).unwrap();
        assert!(!finish_submission(&mut app));
        assert!(!app.exit_after_submit);
        assert!(!app.allow_close);
        assert!(app.session.is_dirty());
        assert_eq!(app.session.request_exit(), ExitDecision::Confirm);
    }

    #[test]
    fn test_plain_submit_never_closes() {
        let (mut app, release) = gated_app();
        draw(&mut app, 1.0);
        app.start_submission(false);

        release.send(()).unwrap();
        assert!(!finish_submission(&mut app));
        assert!(!app.session.is_dirty());
    }
}
