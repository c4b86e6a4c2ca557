// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Comment and review summary panel.
//!
//! Edits go into the session's working comment; they are committed to the
//! frame when the coach saves or moves to another second.

use crate::session::FrameAnnotationSession;

/// Display the side panel.
pub fn show(ui: &mut egui::Ui, session: &mut FrameAnnotationSession, editable: bool, status: Option<&str>) {
    ui.heading(format!("Second {}", session.current_second()));
    ui.add_space(6.0);

    if editable {
        ui.label("Comment");
        let mut comment = session.working_comment().to_string();
        let response = ui.add(
            egui::TextEdit::multiline(&mut comment)
                .hint_text("What should the player notice here?")
                .desired_rows(4),
        );
        if response.changed() {
            session.set_comment(comment);
        }

        ui.add_space(10.0);
        ui.label("Review summary");
        let mut summary = session.summary().to_string();
        if ui
            .add(egui::TextEdit::multiline(&mut summary).desired_rows(3))
            .changed()
        {
            session.set_summary(summary);
        }
    } else {
        let position = session.video().position_seconds();
        match session.overlay_at(position) {
            Some(frame) if !frame.comment.is_empty() => {
                ui.label(frame.comment.as_str());
            }
            _ => {
                ui.label(egui::RichText::new("No comment for this second").weak());
            }
        }
    }

    ui.separator();
    ui.label("Annotated seconds");
    let annotated = session.annotated_seconds();
    if annotated.is_empty() {
        ui.label(egui::RichText::new("None yet").weak());
    } else {
        for second in annotated {
            let strokes = session
                .annotations()
                .get(second as usize)
                .map_or(0, |f| f.drawings.len());
            ui.label(format!("{}s: {} stroke(s)", second, strokes));
        }
    }

    ui.separator();
    if session.has_unsaved_changes() {
        ui.label(egui::RichText::new("● Unsaved changes").color(egui::Color32::from_rgb(255, 160, 0)));
    } else {
        ui.label(egui::RichText::new("All changes saved").weak());
    }
    if let Some(message) = status {
        ui.label(message);
    }
}
