// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame annotation session.
//!
//! A session owns the annotation set for one video under review, the
//! current-second cursor, the drawing tool settings, and the stroke being
//! drawn. All reads and writes from the UI go through it so that switching
//! seconds always commits the comment being edited and drops any
//! unfinished stroke before the video is sought.

pub mod autosave;
pub mod navigator;

use crate::io::feedback::{Receipt, SubmitError};
use crate::io::media::VideoSource;
use crate::io::store::{KeyValueStore, StoreError};
use crate::models::annotation::{AnnotationSet, FrameAnnotation, Point, Stroke, StrokeColor, Thickness};
use crate::models::review::{ReviewData, Submission};

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Scrub and inspect without drawing.
    Select,
    /// Freehand stroke following the pointer.
    #[default]
    Pen,
    /// Straight segment from press to release.
    Line,
}

impl Tool {
    /// Whether pointer drags with this tool produce strokes.
    pub fn draws_strokes(self) -> bool {
        matches!(self, Tool::Pen | Tool::Line)
    }
}

/// Pointer gesture state. A stroke lives here until pointer-up commits it.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing(Stroke),
}

/// Answer to an exit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Nothing unsaved; the host may close right away.
    Allowed,
    /// Unsaved changes; the host must ask save, discard or cancel.
    Confirm,
}

/// User's answer to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    SaveAndExit,
    DiscardAndExit,
    Cancel,
}

/// What the host should do after an exit choice is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exit,
    Stay,
    /// Submit the review; close only once it is accepted and nothing
    /// changed in the meantime.
    SubmitThenExit,
}

/// Errors raised while opening or restoring a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Video duration is not available")]
    NoDuration,

    #[error("Checkpoint unavailable: {0}")]
    Checkpoint(#[from] StoreError),
}

/// Annotation state for one video review.
pub struct FrameAnnotationSession {
    video_id: String,
    video: Box<dyn VideoSource>,
    total_seconds: u32,
    current_second: u32,
    annotations: AnnotationSet,
    /// Comment being edited for `current_second`; folded into the frame on
    /// navigation and save.
    working_comment: String,
    /// Review-wide feedback sent alongside the annotations.
    summary: String,
    tool: Tool,
    color: StrokeColor,
    thickness: Thickness,
    gesture: Gesture,
    dirty: bool,
    /// Bumped on every committed mutation.
    revision: u64,
    /// Revision and working comment of the last checkpoint written.
    checkpointed: Option<(u64, String)>,
}

impl FrameAnnotationSession {
    /// Open a session, sizing it from the video's duration.
    ///
    /// The number of reviewable seconds is `ceil(duration)` clamped to
    /// `max_review_seconds`, and never less than one.
    pub fn open(
        video_id: impl Into<String>,
        video: Box<dyn VideoSource>,
        max_review_seconds: u32,
    ) -> Result<Self, SessionError> {
        let duration = video
            .duration_seconds()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or(SessionError::NoDuration)?;
        let total_seconds = (duration.ceil() as u32).min(max_review_seconds).max(1);
        let video_id = video_id.into();
        log::info!(
            "Opened review session for {} ({:.2}s, {} reviewable seconds)",
            video_id,
            duration,
            total_seconds
        );

        let mut annotations = AnnotationSet::new();
        annotations.entry(0);

        Ok(Self {
            video_id,
            video,
            total_seconds,
            current_second: 0,
            annotations,
            working_comment: String::new(),
            summary: String::new(),
            tool: Tool::default(),
            color: StrokeColor::Red,
            thickness: Thickness::default(),
            gesture: Gesture::Idle,
            dirty: false,
            revision: 0,
            checkpointed: None,
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn current_second(&self) -> u32 {
        self.current_second
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    /// Committed annotation for the current second.
    pub fn current_frame(&self) -> Option<&FrameAnnotation> {
        self.annotations.get(self.current_second as usize)
    }

    pub fn working_comment(&self) -> &str {
        &self.working_comment
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn video(&self) -> &dyn VideoSource {
        self.video.as_ref()
    }

    pub fn video_mut(&mut self) -> &mut dyn VideoSource {
        self.video.as_mut()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool && !tool.draws_strokes() {
            self.cancel_stroke();
        }
        self.tool = tool;
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    pub fn set_color(&mut self, color: StrokeColor) {
        self.color = color;
    }

    pub fn thickness(&self) -> Thickness {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: Thickness) {
        self.thickness = thickness;
    }

    /// Stroke currently being drawn, if any.
    pub fn in_progress_stroke(&self) -> Option<&Stroke> {
        match self.gesture {
            Gesture::Drawing(ref stroke) => Some(stroke),
            Gesture::Idle => None,
        }
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Fold the working comment into the current frame, creating the frame
    /// entry if it does not exist yet.
    fn reconcile_current_frame(&mut self) {
        let frame = self.annotations.entry(self.current_second as usize);
        if frame.comment != self.working_comment {
            frame.comment = self.working_comment.clone();
            self.mark_changed();
        }
    }

    /// Move the cursor to `target`.
    ///
    /// The comment being edited is committed to the second being left and
    /// any unfinished stroke is dropped before the video is sought. Returns
    /// `false` without touching any state when `target` is out of range.
    pub fn select_second(&mut self, target: u32) -> bool {
        if target >= self.total_seconds {
            log::debug!(
                "Ignoring selection of second {} (session has {})",
                target,
                self.total_seconds
            );
            return false;
        }

        self.reconcile_current_frame();
        if let Gesture::Drawing(ref stroke) = self.gesture {
            log::debug!("Discarding unfinished stroke of {} points", stroke.points.len());
        }
        self.gesture = Gesture::Idle;

        self.current_second = target;
        self.working_comment = self.annotations.entry(target as usize).comment.clone();

        if let Err(e) = self.video.seek_and_pause(target) {
            log::warn!("Seek to second {} failed: {}", target, e);
        }
        log::debug!("Selected second {}", target);
        true
    }

    /// Start a stroke at `point` with the active color and thickness.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if !self.tool.draws_strokes() {
            log::debug!("Tool {:?} does not draw, ignoring stroke start", self.tool);
            return false;
        }
        if matches!(self.gesture, Gesture::Drawing(_)) {
            log::debug!("Stroke already in progress, ignoring stroke start");
            return false;
        }
        self.gesture = Gesture::Drawing(Stroke::new(point, self.color, self.thickness));
        true
    }

    /// Add a point to the stroke in progress.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.gesture {
            Gesture::Drawing(ref mut stroke) => {
                stroke.add_point(point);
                true
            }
            Gesture::Idle => false,
        }
    }

    /// Append the stroke in progress to the current second's drawings.
    pub fn commit_stroke(&mut self) -> bool {
        let Gesture::Drawing(stroke) = std::mem::take(&mut self.gesture) else {
            return false;
        };
        let frame = self.annotations.entry(self.current_second as usize);
        frame.drawings.push(stroke);
        let count = frame.drawings.len();
        self.mark_changed();
        log::info!("Added stroke at second {}, total: {}", self.current_second, count);
        true
    }

    /// Drop the stroke in progress without committing it.
    pub fn cancel_stroke(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Remove the most recent stroke of the current second.
    pub fn undo_last_stroke(&mut self) -> bool {
        let removed = self
            .annotations
            .entry(self.current_second as usize)
            .drawings
            .pop()
            .is_some();
        if removed {
            self.mark_changed();
            log::info!("Removed last stroke at second {}", self.current_second);
        }
        removed
    }

    /// Replace the comment being edited for the current second.
    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.working_comment = text.into();
    }

    pub fn set_summary(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.summary {
            self.summary = text;
            self.mark_changed();
        }
    }

    /// Commit the current frame and clear the unsaved-changes flag.
    pub fn save_current_frame(&mut self) {
        self.reconcile_current_frame();
        self.dirty = false;
        log::info!("Saved frame at second {}", self.current_second);
    }

    /// True when exiting now would lose work.
    pub fn has_unsaved_changes(&self) -> bool {
        let comment_pending = self
            .current_frame()
            .map_or(!self.working_comment.is_empty(), |f| f.comment != self.working_comment);
        self.dirty || comment_pending
    }

    /// Decide whether the host may close the session straight away.
    pub fn request_exit(&self) -> ExitDecision {
        if self.has_unsaved_changes() {
            ExitDecision::Confirm
        } else {
            ExitDecision::Allowed
        }
    }

    /// Apply the user's answer to the unsaved-changes prompt.
    ///
    /// Discarding also blanks the local checkpoint in `store` so a later
    /// restore cannot bring the discarded work back.
    pub fn resolve_exit(&mut self, choice: ExitChoice, store: &mut dyn KeyValueStore) -> ExitOutcome {
        match choice {
            ExitChoice::Cancel => ExitOutcome::Stay,
            ExitChoice::DiscardAndExit => {
                self.discard();
                if let Err(e) = self.clear_checkpoint(store) {
                    log::warn!("Failed to clear checkpoint for {}: {}", self.video_id, e);
                }
                ExitOutcome::Exit
            }
            ExitChoice::SaveAndExit => ExitOutcome::SubmitThenExit,
        }
    }

    /// Whether a submission that ended with `result` lets the host close.
    ///
    /// Call after [`complete_submission`](Self::complete_submission).
    pub fn may_exit_after_submission(&self, result: &Result<Receipt, SubmitError>) -> bool {
        result.is_ok() && !self.has_unsaved_changes()
    }

    /// Throw away every annotation and reset the session to its opening state.
    pub fn discard(&mut self) {
        self.annotations = AnnotationSet::new();
        self.annotations.entry(self.current_second as usize);
        self.working_comment.clear();
        self.summary.clear();
        self.gesture = Gesture::Idle;
        self.dirty = false;
        log::info!("Discarded annotations for {}", self.video_id);
    }

    /// Seconds with at least one stroke or a non-empty comment.
    pub fn annotated_seconds(&self) -> Vec<u32> {
        self.annotations
            .annotated_seconds()
            .into_iter()
            .map(|s| s as u32)
            .collect()
    }

    /// Copy of the annotation set with the working comment applied.
    pub fn snapshot(&self) -> AnnotationSet {
        let mut annotations = self.annotations.clone();
        let second = self.current_second as usize;
        let pending = annotations
            .get(second)
            .map_or(!self.working_comment.is_empty(), |f| f.comment != self.working_comment);
        if pending {
            annotations.entry(second).comment = self.working_comment.clone();
        }
        annotations
    }

    /// Commit the current frame and copy everything needed for submission.
    pub fn prepare_submission(&mut self) -> Submission {
        self.reconcile_current_frame();
        Submission {
            video_id: self.video_id.clone(),
            comment: self.summary.clone(),
            annotations: self.annotations.clone(),
            revision: self.revision,
        }
    }

    /// Record the result of a submission prepared at `revision`.
    ///
    /// Success clears the unsaved flag only if nothing changed after the
    /// snapshot was taken. Failure always leaves the session marked unsaved.
    pub fn complete_submission(&mut self, revision: u64, result: &Result<Receipt, SubmitError>) {
        match result {
            Ok(_) if revision == self.revision => self.dirty = false,
            Ok(_) => log::info!("Session changed during submission, keeping unsaved flag"),
            Err(_) => self.dirty = true,
        }
    }

    /// Export the review, including the comment being edited.
    pub fn review_data(&self) -> ReviewData {
        ReviewData {
            video_id: self.video_id.clone(),
            total_seconds: self.total_seconds,
            annotations: self.snapshot(),
        }
    }

    /// Replace the annotation set with a previously exported or
    /// checkpointed one. Seconds beyond this session's range are dropped.
    pub fn load_annotations(&mut self, mut annotations: AnnotationSet) {
        annotations.truncate(self.total_seconds as usize);
        annotations.entry(self.current_second as usize);
        self.working_comment = annotations
            .get(self.current_second as usize)
            .map(|f| f.comment.clone())
            .unwrap_or_default();
        self.annotations = annotations;
        self.gesture = Gesture::Idle;
        self.dirty = false;
    }

    /// Annotation to overlay during playback at `position` seconds.
    pub fn overlay_at(&self, position: f64) -> Option<&FrameAnnotation> {
        if !position.is_finite() || position < 0.0 {
            return None;
        }
        self.annotations
            .get(position.floor() as usize)
            .filter(|f| f.is_annotated())
    }
}
