// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Review-level records built from an annotation set.
//!
//! This module holds the shapes that leave a session: local checkpoints,
//! exported review files, and the payload handed to the feedback endpoint.

use super::annotation::AnnotationSet;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot written to the local key-value store by autosave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub annotations: AnnotationSet,
}

impl Checkpoint {
    /// Stamp `annotations` with the current wall-clock time.
    pub fn now(annotations: AnnotationSet) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            timestamp,
            annotations,
        }
    }
}

/// Complete review data for export and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewData {
    pub video_id: String,
    pub total_seconds: u32,
    pub annotations: AnnotationSet,
}

/// Copied snapshot of a session handed to the feedback endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub video_id: String,
    pub comment: String,
    pub annotations: AnnotationSet,
    /// Session revision the snapshot was taken at.
    pub revision: u64,
}
