// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-second timeline strip.
//!
//! This module provides the previous/next controls and one indicator per
//! reviewable second, highlighting seconds that carry annotations.

use crate::session::navigator::FrameIndicator;

/// Result of timeline interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineAction {
    None,
    Previous,
    Next,
    Jump(u32),
    TogglePlayback,
}

/// Display the timeline.
///
/// Coaches get navigation controls; students get play/pause with the
/// indicators shown for reference only.
pub fn show(
    ui: &mut egui::Ui,
    indicators: &[FrameIndicator],
    can_navigate: bool,
    playing: bool,
) -> TimelineAction {
    let mut action = TimelineAction::None;

    ui.horizontal(|ui| {
        if can_navigate {
            let at_start = indicators.first().map_or(true, |i| i.current);
            let at_end = indicators.last().map_or(true, |i| i.current);
            if ui.add_enabled(!at_start, egui::Button::new("◀")).clicked() {
                action = TimelineAction::Previous;
            }
            if ui.add_enabled(!at_end, egui::Button::new("▶")).clicked() {
                action = TimelineAction::Next;
            }
        } else {
            let label = if playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).clicked() {
                action = TimelineAction::TogglePlayback;
            }
        }

        ui.separator();

        for indicator in indicators {
            let mut text = egui::RichText::new(format!("{}s", indicator.second));
            if indicator.annotated {
                text = text.color(egui::Color32::from_rgb(255, 200, 0)).strong();
            }
            let button = egui::Button::new(text).selected(indicator.current);
            if ui.add_enabled(can_navigate, button).clicked() {
                action = TimelineAction::Jump(indicator.second);
            }
        }
    });

    action
}
