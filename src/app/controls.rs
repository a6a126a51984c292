use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use folio_field::selection::fuzzy_match_score;
use folio_field::{Category, ShareState};

use super::ViewModel;
use super::render_utils::category_color;

const MAX_SUGGESTIONS: usize = 6;
const MAX_TABLE_ROWS: usize = 40;

impl ViewModel {
    pub(super) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            self.draw_search(ui);
            ui.separator();
            self.draw_categories(ui);
            ui.separator();
            self.draw_link(ui);
            ui.separator();
            self.draw_motion(ui);
            ui.separator();
            self.draw_experience_table(ui);
        });
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        let response = ui.text_edit_singleline(&mut self.query_input);
        if response.changed() {
            let query = self.query_input.trim();
            let next = ShareState {
                query: (!query.is_empty()).then(|| query.to_owned()),
                filter: self.link.filter.clone(),
            };
            self.navigate(next);
        }

        let query = self.query_input.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut suggestions = self
            .field
            .portfolio()
            .visual_items()
            .filter_map(|item| {
                fuzzy_match_score(&matcher, &item.name, &query)
                    .map(|score| (score, item.name.clone()))
            })
            .collect::<Vec<_>>();
        suggestions.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let mut picked = None;
        ui.horizontal_wrapped(|ui| {
            for (_, name) in suggestions.iter().take(MAX_SUGGESTIONS) {
                if ui.small_button(name).clicked() {
                    picked = Some(name.clone());
                }
            }
        });
        if let Some(name) = picked {
            self.navigate(ShareState {
                query: Some(name),
                filter: self.link.filter.clone(),
            });
        }
    }

    fn draw_categories(&mut self, ui: &mut Ui) {
        ui.heading("Categories");
        let selection = self.field.selection();
        let active = selection.active_category;
        let item = selection.active_item.clone();

        let mut clicked = None;
        ui.horizontal_wrapped(|ui| {
            for category in Category::ALL {
                let months = self.field.table().category(category).total_months;
                let label = RichText::new(format!("{} ({months})", category.label()))
                    .color(category_color(Some(category)));
                if ui.selectable_label(active == Some(category), label).clicked() {
                    clicked = Some(category);
                }
            }
        });
        if let Some(category) = clicked {
            self.field.click_category(category);
        }

        ui.add_space(4.0);
        ui.label(format!(
            "active: {} / {}",
            item.as_deref().unwrap_or("-"),
            active.map(Category::label).unwrap_or("-")
        ));
        if let Some(intent) = &self.last_intent {
            ui.label(RichText::new(format!("last intent: {intent}")).weak());
        }
    }

    fn draw_link(&mut self, ui: &mut Ui) {
        ui.heading("Link");
        ui.horizontal(|ui| {
            ui.label("?");
            ui.text_edit_singleline(&mut self.link_input);
        });
        ui.horizontal(|ui| {
            if ui.button("Open link").clicked() {
                let next = ShareState::from_search(&self.link_input);
                self.navigate(next);
            }
            if ui.button("Clear").clicked() {
                self.navigate(ShareState::default());
            }
        });
    }

    fn draw_motion(&mut self, ui: &mut Ui) {
        ui.heading("Motion");
        let mut reduced = self.field.reduced_motion();
        if ui.checkbox(&mut reduced, "Reduced motion").changed() {
            self.field.set_reduced_motion(reduced);
        }

        let simulation = self.field.simulation();
        ui.label(format!(
            "alpha {:.3} | ticks {} | {}",
            simulation.alpha(),
            simulation.ticks(),
            if simulation.is_settled() { "settled" } else { "running" }
        ));
        if let Some(dimensions) = self.field.dimensions() {
            ui.label(format!(
                "field {:.0} x {:.0}",
                dimensions.width, dimensions.height
            ));
        }
    }

    fn draw_experience_table(&mut self, ui: &mut Ui) {
        ui.heading("Experience");
        let table = self.field.table();
        let mut rows = self
            .field
            .portfolio()
            .visual_items()
            .map(|item| (item.name.clone(), item.category, table.node(&item.name)))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            b.2.total_months
                .cmp(&a.2.total_months)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut clicked = None;
        egui::Grid::new("experience_table")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui| {
                for (name, category, experience) in rows.iter().take(MAX_TABLE_ROWS) {
                    let label = RichText::new(name).color(category_color(Some(*category)));
                    if ui.link(label).clicked() {
                        clicked = Some(name.clone());
                    }
                    ui.label(format!("{} mo", experience.total_months));
                    ui.label(format!("{}x", experience.engagement_count));
                    ui.end_row();
                }
            });
        if let Some(name) = clicked {
            self.field.click_node(&name);
        }
        ui.label(
            RichText::new(format!("as of {}", self.field.table().evaluated_on())).weak(),
        );
    }
}
