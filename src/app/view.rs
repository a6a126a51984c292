use std::time::{Duration, Instant};

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Stroke, Ui};

use folio_field::sim::ROOT_ID;

use super::ViewModel;
use super::render_utils::{
    blend_color, category_color, dim_color, draw_background, initials, ring_segment,
};

impl ViewModel {
    pub(super) fn draw_field(&mut self, ui: &mut Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let now = Instant::now();
        self.field.observe_size(rect.width(), rect.height(), now);

        let local = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .map(|pointer| (pointer - rect.min).to_pos2());
        self.field.pointer_move(local);

        let hovered = local
            .and_then(|pointer| self.field.node_at(pointer))
            .map(str::to_owned);
        if !self.dragging {
            self.field.hover_node(hovered.as_deref());
        }
        let ring_offset = match (local, self.field.simulation().position(ROOT_ID)) {
            (Some(pointer), Some(root)) if hovered.as_deref().is_none_or(|id| id == ROOT_ID) => {
                Some(pointer - root)
            }
            _ => None,
        };
        self.field.hover_summary_at(ring_offset);

        if response.drag_started_by(PointerButton::Primary)
            && let (Some(id), Some(pointer)) = (hovered.as_deref(), local)
        {
            self.dragging = self.field.drag_start(id, pointer);
        }
        if self.dragging
            && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
        {
            self.field.drag_move((pointer - rect.min).to_pos2());
        }
        if self.dragging && response.drag_stopped() {
            self.field.drag_end();
            self.dragging = false;
        }

        if response.clicked_by(PointerButton::Primary) {
            match hovered.as_deref() {
                Some(id) if id != ROOT_ID => {
                    self.field.click_node(id);
                }
                _ => {
                    if let Some(category) = self.field.hover_state().category {
                        self.field.click_category(category);
                    }
                }
            }
        }
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        self.field.frame(now);

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);
        self.paint_field(ui, &painter, rect);

        let simulation = self.field.simulation();
        if simulation.is_settled() || !simulation.is_active() {
            // Keep polling so a debounced resize still lands.
            ui.ctx().request_repaint_after(Duration::from_millis(100));
        } else {
            ui.ctx().request_repaint();
        }
    }

    fn paint_field(&self, ui: &Ui, painter: &egui::Painter, rect: egui::Rect) {
        let selection = self.field.selection();
        let summary = self.field.summary();
        let emphasis_secs = self.field.transition_duration().as_secs_f32();
        let focus_active = selection.active_item.is_some() || selection.active_category.is_some();
        let selected_color = Color32::from_rgb(245, 206, 93);

        let mut frames = self.field.frames();
        // Hovered and selected nodes draw last so they sit on top.
        frames.sort_by_key(|frame| (frame.hovered, frame.selected));

        for frame in &frames {
            let center = rect.min + frame.position.to_vec2();

            if frame.is_root {
                let active = selection.active_category;
                for segment in &summary.segments {
                    let mut color = category_color(Some(segment.category));
                    if active.is_some_and(|category| category != segment.category) {
                        color = dim_color(color, 0.45);
                    }
                    ring_segment(
                        painter,
                        center,
                        summary.inner_radius,
                        summary.thickness(segment.category, active),
                        (segment.start_angle, segment.end_angle),
                        color,
                    );
                }
                painter.circle_filled(center, summary.inner_radius, Color32::from_rgb(36, 42, 52));
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    format!("{} mo", summary.total_months),
                    FontId::proportional(16.0),
                    Color32::from_rgb(232, 236, 242),
                );
                continue;
            }

            let emphasis = ui.ctx().animate_bool_with_time(
                egui::Id::new(("node-hover", frame.id)),
                frame.hovered,
                emphasis_secs,
            );
            let in_focus = selection.is_highlighted(frame.id)
                || (selection.active_category.is_some()
                    && selection.active_category == frame.category);

            let mut fill = category_color(frame.category);
            if focus_active && !in_focus {
                fill = dim_color(fill, 0.45);
            }
            fill = blend_color(fill, Color32::WHITE, emphasis * 0.25);

            painter.circle_filled(center, frame.radius, fill);
            if frame.selected {
                painter.circle_stroke(center, frame.radius + 2.5, Stroke::new(2.0, selected_color));
            }
            painter.text(
                center,
                Align2::CENTER_CENTER,
                initials(frame.id),
                FontId::proportional((frame.radius * 0.6).clamp(9.0, 22.0)),
                Color32::from_rgb(19, 23, 29),
            );

            if frame.hovered {
                painter.text(
                    center + egui::vec2(0.0, frame.radius + 10.0),
                    Align2::CENTER_TOP,
                    format!(
                        "{} | {} mo",
                        frame.id,
                        self.field.table().node(frame.id).total_months
                    ),
                    FontId::proportional(13.0),
                    Color32::from_rgb(232, 236, 242),
                );
            }
        }
    }
}
