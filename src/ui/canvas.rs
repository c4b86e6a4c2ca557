// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing surface over the video frame.
//!
//! This module shows the current frame, renders strokes on top of it, and
//! turns pointer drags into stroke gestures on the annotation session.

use crate::models::annotation::{FrameAnnotation, Point, Stroke};
use crate::session::{FrameAnnotationSession, Tool};
use crate::util::geometry;

/// Surface size used when the video source has no frame to show.
const DEFAULT_SURFACE: (u32, u32) = (1280, 720);

/// Converts raw pointer events into stroke gestures.
///
/// Pen strokes keep every sample that moved at least `min_sample_distance`
/// from the previous one. Line strokes keep only the press and release
/// points; the latest pointer position is held for previewing.
#[derive(Debug, Default)]
pub struct PointerInput {
    min_sample_distance: f64,
    line_end: Option<Point>,
}

impl PointerInput {
    pub fn new(min_sample_distance: f64) -> Self {
        Self {
            min_sample_distance,
            line_end: None,
        }
    }

    pub fn pointer_down(&mut self, session: &mut FrameAnnotationSession, point: Point) {
        self.line_end = None;
        session.begin_stroke(point);
    }

    pub fn pointer_move(&mut self, session: &mut FrameAnnotationSession, point: Point) {
        let Some(stroke) = session.in_progress_stroke() else {
            return;
        };
        match session.tool() {
            Tool::Line => self.line_end = Some(point),
            _ => {
                if geometry::should_sample(stroke.points.last(), &point, self.min_sample_distance) {
                    session.extend_stroke(point);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, session: &mut FrameAnnotationSession, point: Option<Point>) {
        if session.in_progress_stroke().is_none() {
            self.line_end = None;
            return;
        }
        if let Some(point) = point {
            self.pointer_move(session, point);
        }
        if let Some(end) = self.line_end.take() {
            let start = session.in_progress_stroke().and_then(Stroke::last_point);
            if start != Some(end) {
                session.extend_stroke(end);
            }
        }
        session.commit_stroke();
    }

    pub fn pointer_cancel(&mut self, session: &mut FrameAnnotationSession) {
        self.line_end = None;
        session.cancel_stroke();
    }

    /// Pending end point of a line being dragged.
    pub fn line_preview(&self) -> Option<Point> {
        self.line_end
    }
}

/// Screen placement of the drawing surface.
#[derive(Debug, Clone, Copy)]
struct Placement {
    rect: egui::Rect,
    scale: f32,
}

impl Placement {
    fn to_screen(&self, point: &Point) -> egui::Pos2 {
        let (x, y) = geometry::to_screen(
            point,
            self.rect.min.x as f64,
            self.rect.min.y as f64,
            self.scale as f64,
        );
        egui::pos2(x as f32, y as f32)
    }

    fn to_surface(&self, pos: egui::Pos2) -> Point {
        geometry::to_surface(
            pos.x as f64,
            pos.y as f64,
            self.rect.min.x as f64,
            self.rect.min.y as f64,
            self.scale as f64,
        )
    }
}

/// Display the canvas and handle pointer interaction.
///
/// When `editable` is false (student playback) the overlay for the current
/// playback position is drawn instead of the frame being edited.
pub fn show(
    ui: &mut egui::Ui,
    session: &mut FrameAnnotationSession,
    input: &mut PointerInput,
    texture: &Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    editable: bool,
) {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let (surface_w, surface_h) = frame_size.unwrap_or(DEFAULT_SURFACE);
    let available = ui.available_size();
    let (scale, x_offset, y_offset) = geometry::fit_centered(
        surface_w as f64,
        surface_h as f64,
        available.x as f64,
        available.y as f64,
    );
    let (canvas_rect, response) = ui.allocate_exact_size(available, egui::Sense::drag());
    let placement = Placement {
        rect: egui::Rect::from_min_size(
            canvas_rect.min + egui::vec2(x_offset as f32, y_offset as f32),
            egui::vec2(surface_w as f32 * scale as f32, surface_h as f32 * scale as f32),
        ),
        scale: scale as f32,
    };

    let painter = ui.painter_at(canvas_rect);
    painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
    match texture {
        Some(texture) => {
            painter.image(
                texture.id(),
                placement.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        None => {
            painter.rect_filled(placement.rect, 0.0, egui::Color32::from_gray(20));
        }
    }

    if editable {
        handle_pointer(session, input, &response, &placement);
        if let Some(frame) = session.current_frame() {
            draw_frame(&painter, frame, &placement);
        }
        if let Some(stroke) = session.in_progress_stroke() {
            draw_stroke(&painter, stroke, &placement);
            if let (Some(start), Some(end)) = (stroke.points.first(), input.line_preview()) {
                let mut preview = stroke.clone();
                preview.points = vec![*start, end];
                draw_stroke(&painter, &preview, &placement);
            }
        }
    } else {
        let position = session.video().position_seconds();
        if let Some(frame) = session.overlay_at(position) {
            draw_frame(&painter, frame, &placement);
            if !frame.comment.is_empty() {
                painter.text(
                    placement.rect.left_bottom() + egui::vec2(12.0, -12.0),
                    egui::Align2::LEFT_BOTTOM,
                    &frame.comment,
                    egui::FontId::proportional(18.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}

fn handle_pointer(
    session: &mut FrameAnnotationSession,
    input: &mut PointerInput,
    response: &egui::Response,
    placement: &Placement,
) {
    let pointer = response.interact_pointer_pos();

    if response.drag_started() {
        match pointer {
            Some(pos) if placement.rect.contains(pos) => {
                input.pointer_down(session, placement.to_surface(pos));
            }
            _ => return,
        }
    }

    if response.dragged() {
        if let Some(pos) = pointer {
            input.pointer_move(session, placement.to_surface(placement.rect.clamp(pos)));
        }
    }

    if response.drag_stopped() {
        let point = pointer.map(|pos| placement.to_surface(placement.rect.clamp(pos)));
        input.pointer_up(session, point);
    }
}

/// Draw every stroke of a frame in insertion order.
fn draw_frame(painter: &egui::Painter, frame: &FrameAnnotation, placement: &Placement) {
    for stroke in &frame.drawings {
        draw_stroke(painter, stroke, placement);
    }
}

fn draw_stroke(painter: &egui::Painter, stroke: &Stroke, placement: &Placement) {
    let [r, g, b] = stroke.color.rgb();
    let color = egui::Color32::from_rgb(r, g, b);
    let width = stroke.thickness.value() as f32 * placement.scale;

    let screen_points: Vec<egui::Pos2> = stroke.points.iter().map(|p| placement.to_screen(p)).collect();
    match screen_points.as_slice() {
        [] => {}
        [single] => {
            painter.circle_filled(*single, width / 2.0, color);
        }
        _ => {
            painter.add(egui::Shape::line(screen_points, egui::Stroke::new(width, color)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::session_with;

    #[test]
    fn test_pen_drops_samples_closer_than_threshold() {
        let (mut session, _) = session_with(5.0, 5);
        let mut input = PointerInput::new(2.0);

        input.pointer_down(&mut session, Point::new(0.0, 0.0));
        input.pointer_move(&mut session, Point::new(0.5, 0.5));
        input.pointer_move(&mut session, Point::new(3.0, 0.0));
        input.pointer_move(&mut session, Point::new(3.5, 0.0));
        input.pointer_up(&mut session, Some(Point::new(10.0, 0.0)));

        let stroke = &session.current_frame().unwrap().drawings[0];
        assert_eq!(
            stroke.points,
            vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(10.0, 0.0)]
        );
    }

    #[test]
    fn test_line_keeps_only_endpoints() {
        let (mut session, _) = session_with(5.0, 5);
        session.set_tool(Tool::Line);
        let mut input = PointerInput::new(1.0);

        input.pointer_down(&mut session, Point::new(5.0, 5.0));
        input.pointer_move(&mut session, Point::new(20.0, 30.0));
        assert_eq!(input.line_preview(), Some(Point::new(20.0, 30.0)));
        input.pointer_move(&mut session, Point::new(40.0, 50.0));
        assert_eq!(session.in_progress_stroke().unwrap().points.len(), 1);
        input.pointer_up(&mut session, None);

        let stroke = &session.current_frame().unwrap().drawings[0];
        assert_eq!(stroke.points, vec![Point::new(5.0, 5.0), Point::new(40.0, 50.0)]);
        assert_eq!(input.line_preview(), None);
    }

    #[test]
    fn test_tap_commits_single_point_stroke() {
        let (mut session, _) = session_with(5.0, 5);
        let mut input = PointerInput::new(1.0);
        input.pointer_down(&mut session, Point::new(7.0, 7.0));
        input.pointer_up(&mut session, Some(Point::new(7.0, 7.0)));

        let drawings = &session.current_frame().unwrap().drawings;
        assert_eq!(drawings.len(), 1);
        assert_eq!(drawings[0].points, vec![Point::new(7.0, 7.0)]);
    }

    #[test]
    fn test_select_tool_ignores_drags() {
        let (mut session, _) = session_with(5.0, 5);
        session.set_tool(Tool::Select);
        let mut input = PointerInput::new(1.0);
        input.pointer_down(&mut session, Point::new(1.0, 1.0));
        input.pointer_move(&mut session, Point::new(9.0, 9.0));
        input.pointer_up(&mut session, None);

        assert!(session.annotated_seconds().is_empty());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_cancel_discards_stroke() {
        let (mut session, _) = session_with(5.0, 5);
        let mut input = PointerInput::new(1.0);
        input.pointer_down(&mut session, Point::new(1.0, 1.0));
        input.pointer_move(&mut session, Point::new(9.0, 9.0));
        input.pointer_cancel(&mut session);
        input.pointer_up(&mut session, Some(Point::new(12.0, 12.0)));

        assert!(session.current_frame().unwrap().drawings.is_empty());
    }
}
