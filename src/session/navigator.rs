// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Second-by-second navigation.
//!
//! Every move goes through [`FrameAnnotationSession::select_second`] so the
//! comment flush and seek happen on each change.

use super::FrameAnnotationSession;

/// Display state for one second in the timeline strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameIndicator {
    pub second: u32,
    pub annotated: bool,
    pub current: bool,
}

/// Step back one second. No-op at the first second.
pub fn previous(session: &mut FrameAnnotationSession) -> bool {
    match session.current_second().checked_sub(1) {
        Some(target) => session.select_second(target),
        None => false,
    }
}

/// Step forward one second. No-op at the last second.
pub fn next(session: &mut FrameAnnotationSession) -> bool {
    let target = session.current_second() + 1;
    if target >= session.total_seconds() {
        return false;
    }
    session.select_second(target)
}

/// Jump straight to `second` from an indicator.
pub fn jump(session: &mut FrameAnnotationSession, second: u32) -> bool {
    session.select_second(second)
}

/// One indicator per reviewable second.
pub fn indicators(session: &FrameAnnotationSession) -> Vec<FrameIndicator> {
    let annotated = session.annotated_seconds();
    (0..session.total_seconds())
        .map(|second| FrameIndicator {
            second,
            annotated: annotated.contains(&second),
            current: second == session.current_second(),
        })
        .collect()
}
