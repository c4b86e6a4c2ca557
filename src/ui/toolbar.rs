// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar interface for selecting drawing
//! tools, stroke color and thickness, and the frame/review actions.

use crate::models::annotation::{StrokeColor, Thickness};
use crate::session::{FrameAnnotationSession, Tool};

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Undo,
    SaveFrame,
    Submit,
    Export,
}

/// Display the toolbar. Tool settings are applied to the session directly.
pub fn show(ui: &mut egui::Ui, session: &mut FrameAnnotationSession, submitting: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");
        ui.separator();

        let tool = session.tool();
        if ui.selectable_label(tool == Tool::Select, "⬆ Select").clicked() {
            session.set_tool(Tool::Select);
        }
        if ui.selectable_label(tool == Tool::Pen, "✏ Pen").clicked() {
            session.set_tool(Tool::Pen);
        }
        if ui.selectable_label(tool == Tool::Line, "⟋ Line").clicked() {
            session.set_tool(Tool::Line);
        }

        ui.separator();

        for color in StrokeColor::PALETTE {
            let [r, g, b] = color.rgb();
            let selected = session.color() == color;
            let swatch = egui::Button::new(egui::RichText::new("⬤").color(egui::Color32::from_rgb(r, g, b)))
                .selected(selected);
            if ui.add(swatch).on_hover_text(format!("{:?}", color)).clicked() {
                session.set_color(color);
            }
        }

        ui.separator();

        for thickness in Thickness::ALL {
            let label = format!("{}px", thickness.value());
            if ui.selectable_label(session.thickness() == thickness, label).clicked() {
                session.set_thickness(thickness);
            }
        }

        ui.separator();

        let has_strokes = session.current_frame().is_some_and(|f| !f.drawings.is_empty());
        if ui.add_enabled(has_strokes, egui::Button::new("↶ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.button("💾 Save frame").clicked() {
            action = ToolbarAction::SaveFrame;
        }
        if ui.add_enabled(!submitting, egui::Button::new("📤 Submit")).clicked() {
            action = ToolbarAction::Submit;
        }
        if ui.button("Export…").clicked() {
            action = ToolbarAction::Export;
        }

        ui.separator();

        let tool_text = match session.tool() {
            Tool::Select => "Scrub between seconds without drawing",
            Tool::Pen => "Drag to draw a freehand stroke",
            Tool::Line => "Drag to draw a straight line",
        };
        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
