// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Best-effort local checkpoints.
//!
//! While a session has unsaved changes its annotations are written to the
//! key-value store on a fixed interval. Failures are logged and otherwise
//! ignored; the next tick simply tries again.

use super::{FrameAnnotationSession, SessionError};
use crate::io::store::{KeyValueStore, StoreError};
use crate::models::annotation::AnnotationSet;
use crate::models::review::Checkpoint;
use std::time::{Duration, Instant};

/// Store key for a video's checkpoint.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`.
pub fn checkpoint_key(video_id: &str) -> String {
    let sanitized: String = video_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("annotations_{}", sanitized)
}

/// Fixed-interval trigger for autosave.
pub struct AutosaveTimer {
    interval: Duration,
    next_due: Instant,
}

impl AutosaveTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// True once per elapsed interval.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }
}

/// Result of one autosave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    /// Nothing unsaved.
    Clean,
    /// Already checkpointed at this revision.
    Unchanged,
    Saved,
    /// Store rejected the write; state is untouched.
    Failed,
}

impl FrameAnnotationSession {
    pub fn checkpoint_key(&self) -> String {
        checkpoint_key(&self.video_id)
    }

    /// Write a checkpoint if the session is dirty.
    ///
    /// Never clears the unsaved flag.
    pub fn autosave(&mut self, store: &mut dyn KeyValueStore) -> AutosaveOutcome {
        if !self.has_unsaved_changes() {
            return AutosaveOutcome::Clean;
        }
        let marker = (self.revision, self.working_comment.clone());
        if self.checkpointed.as_ref() == Some(&marker) {
            return AutosaveOutcome::Unchanged;
        }

        let checkpoint = Checkpoint::now(self.snapshot());
        let key = self.checkpoint_key();
        let result = serde_json::to_string(&checkpoint)
            .map_err(StoreError::from)
            .and_then(|json| store.put(&key, &json));

        match result {
            Ok(()) => {
                self.checkpointed = Some(marker);
                log::info!("Autosaved {} to {}", self.video_id, key);
                AutosaveOutcome::Saved
            }
            Err(e) => {
                log::warn!("Autosave of {} failed: {}", self.video_id, e);
                AutosaveOutcome::Failed
            }
        }
    }

    /// Reload annotations from this video's checkpoint.
    ///
    /// Only applies when the session has no local changes. Returns whether
    /// a checkpoint was loaded.
    pub fn restore_checkpoint(&mut self, store: &dyn KeyValueStore) -> Result<bool, SessionError> {
        if self.has_unsaved_changes() {
            log::info!("Session has local changes, not restoring checkpoint");
            return Ok(false);
        }
        let Some(json) = store.get(&self.checkpoint_key())? else {
            return Ok(false);
        };
        let checkpoint: Checkpoint = serde_json::from_str(&json)
            .map_err(|e| SessionError::Checkpoint(e.into()))?;
        if checkpoint.annotations.annotated_seconds().is_empty() {
            return Ok(false);
        }
        log::info!(
            "Restored checkpoint for {} taken at {}",
            self.video_id,
            checkpoint.timestamp
        );
        self.load_annotations(checkpoint.annotations);
        self.checkpointed = Some((self.revision, self.working_comment.clone()));
        Ok(true)
    }

    /// Overwrite this video's checkpoint with an empty one.
    pub fn clear_checkpoint(&mut self, store: &mut dyn KeyValueStore) -> Result<(), SessionError> {
        let json = serde_json::to_string(&Checkpoint::now(AnnotationSet::new())).map_err(StoreError::from)?;
        store.put(&self.checkpoint_key(), &json)?;
        self.checkpointed = None;
        log::info!("Cleared checkpoint for {}", self.video_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::models::annotation::Point;
    use crate::session::tests::session_with;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn put(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    fn draw(session: &mut FrameAnnotationSession) {
        session.begin_stroke(Point::new(4.0, 4.0));
        session.extend_stroke(Point::new(8.0, 8.0));
        session.commit_stroke();
    }

    #[test]
    fn test_checkpoint_key_sanitizes_id() {
        assert_eq!(checkpoint_key("nets/2025-03-01 drive.mp4"), "annotations_nets_2025_03_01_drive_mp4");
        assert_eq!(checkpoint_key("abc123"), "annotations_abc123");
    }

    #[test]
    fn test_timer_fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = AutosaveTimer::new(Duration::from_secs(10), start);
        assert!(!timer.poll(start + Duration::from_secs(9)));
        assert!(timer.poll(start + Duration::from_secs(10)));
        assert!(!timer.poll(start + Duration::from_secs(15)));
        assert!(timer.poll(start + Duration::from_secs(21)));
    }

    #[test]
    fn test_autosave_writes_only_when_dirty() {
        let (mut session, _) = session_with(5.0, 5);
        let mut store = MemoryStore::new();
        assert_eq!(session.autosave(&mut store), AutosaveOutcome::Clean);
        assert_eq!(store.get(&session.checkpoint_key()).unwrap(), None);

        draw(&mut session);
        assert_eq!(session.autosave(&mut store), AutosaveOutcome::Saved);
        assert!(session.is_dirty());
        assert_eq!(session.autosave(&mut store), AutosaveOutcome::Unchanged);

        let json = store.get("annotations_clip_42").unwrap().unwrap();
        let checkpoint: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(&checkpoint.annotations, session.annotations());
        assert!(checkpoint.timestamp > 0);
    }

    #[test]
    fn test_autosave_includes_pending_comment() {
        let (mut session, _) = session_with(5.0, 5);
        let mut store = MemoryStore::new();
        session.set_comment("eyes level");
        assert_eq!(session.autosave(&mut store), AutosaveOutcome::Saved);

        let json = store.get("annotations_clip_42").unwrap().unwrap();
        let checkpoint: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(checkpoint.annotations.get(0).unwrap().comment, "eyes level");
        assert_eq!(session.annotations().get(0).unwrap().comment, "");
    }

    #[test]
    fn test_autosave_failure_leaves_state_untouched() {
        let (mut session, _) = session_with(5.0, 5);
        draw(&mut session);
        let before = session.annotations().clone();

        assert_eq!(session.autosave(&mut BrokenStore), AutosaveOutcome::Failed);
        assert_eq!(session.annotations(), &before);
        assert!(session.is_dirty());

        let mut store = MemoryStore::new();
        assert_eq!(session.autosave(&mut store), AutosaveOutcome::Saved);
    }

    #[test]
    fn test_restore_checkpoint_into_fresh_session() {
        let mut store = MemoryStore::new();
        let (mut first, _) = session_with(5.0, 5);
        first.select_second(1);
        draw(&mut first);
        first.autosave(&mut store);

        let (mut second, _) = session_with(5.0, 5);
        assert!(second.restore_checkpoint(&store).unwrap());
        assert_eq!(second.annotated_seconds(), vec![1]);
        assert!(!second.is_dirty());

        let (mut busy, _) = session_with(5.0, 5);
        draw(&mut busy);
        assert!(!busy.restore_checkpoint(&store).unwrap());
        assert_eq!(busy.annotated_seconds(), vec![0]);
    }

    #[test]
    fn test_restore_without_checkpoint() {
        let store = MemoryStore::new();
        let (mut session, _) = session_with(5.0, 5);
        assert!(!session.restore_checkpoint(&store).unwrap());
    }

    #[test]
    fn test_cleared_checkpoint_is_not_restored() {
        let mut store = MemoryStore::new();
        let (mut first, _) = session_with(5.0, 5);
        draw(&mut first);
        first.autosave(&mut store);
        first.clear_checkpoint(&mut store).unwrap();
        assert!(store.get("annotations_clip_42").unwrap().is_some());

        let (mut second, _) = session_with(5.0, 5);
        assert!(!second.restore_checkpoint(&store).unwrap());
        assert!(second.annotated_seconds().is_empty());
    }
}
