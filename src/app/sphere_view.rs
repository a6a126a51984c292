use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Ui};

use super::ViewModel;
use super::render_utils::{blend_color, category_color, dim_color, draw_background, initials};

const SPIN_SPEED: f32 = 0.25;

impl ViewModel {
    pub(super) fn draw_sphere(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if !self.field.reduced_motion() {
            let dt = ui.input(|input| input.stable_dt).min(0.1);
            self.sphere_spin = (self.sphere_spin + dt * SPIN_SPEED) % std::f32::consts::TAU;
        }

        let radius = f64::from(rect.width().min(rect.height()) * 0.36);
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));

        let mut placed = self
            .field
            .sphere_layout(radius)
            .into_iter()
            .map(|(id, point)| {
                let (offset, depth) = point.project(self.sphere_spin);
                let level = self.field.node_level(id);
                let size = (10.0 + level as f32 * 4.0) * (1.0 - depth * 0.45);
                (id.to_owned(), rect.center() + offset, size, depth)
            })
            .collect::<Vec<_>>();
        // Back of the sphere first.
        placed.sort_by(|a, b| b.3.total_cmp(&a.3));

        // Front-most hit wins, so search from the end.
        let hovered = pointer.and_then(|pointer| {
            placed
                .iter()
                .rev()
                .find(|(_, center, size, _)| center.distance(pointer) <= *size)
                .map(|(id, ..)| id.clone())
        });

        let selection = self.field.selection();
        let focus_active = selection.active_item.is_some() || selection.active_category.is_some();
        for (id, center, size, depth) in &placed {
            let category = self.field.portfolio().category_of(id);
            let in_focus = selection.is_highlighted(id)
                || (selection.active_category.is_some() && selection.active_category == category);

            let mut fill = dim_color(category_color(category), 1.0 - depth * 0.55);
            if focus_active && !in_focus {
                fill = dim_color(fill, 0.5);
            }
            if hovered.as_deref() == Some(id.as_str()) {
                fill = blend_color(fill, Color32::WHITE, 0.25);
            }

            painter.circle_filled(*center, *size, fill);
            if *depth < 0.5 {
                painter.text(
                    *center,
                    Align2::CENTER_CENTER,
                    initials(id),
                    FontId::proportional((*size * 0.7).clamp(8.0, 18.0)),
                    Color32::from_rgb(19, 23, 29),
                );
            }
        }

        if let Some(id) = hovered.as_deref() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
            if let Some(pointer) = pointer {
                painter.text(
                    pointer + egui::vec2(12.0, 12.0),
                    Align2::LEFT_TOP,
                    id,
                    FontId::proportional(13.0),
                    Color32::from_rgb(232, 236, 242),
                );
            }
            if response.clicked_by(PointerButton::Primary) {
                self.field.click_node(id);
            }
        }

        if self.field.reduced_motion() {
            ui.ctx().request_repaint_after(Duration::from_millis(250));
        } else {
            ui.ctx().request_repaint();
        }
    }
}
