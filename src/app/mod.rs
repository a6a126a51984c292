use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context};

use folio_field::{Field, FieldConfig, FieldEvent, Portfolio, SelectionIntent, ShareState};

mod controls;
mod render_utils;
mod sphere_view;
mod view;

const SAMPLE_PORTFOLIO: &str = include_str!("../../assets/portfolio.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    Field,
    Sphere,
}

pub struct FolioFieldApp {
    data_path: Option<PathBuf>,
    config: FieldConfig,
    initial_link: ShareState,
    initial_mode: ViewMode,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Portfolio, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    field: Field,
    mode: ViewMode,
    /// Router stand-in: the share state as it would appear in the address bar.
    link: ShareState,
    query_input: String,
    link_input: String,
    sphere_spin: f32,
    dragging: bool,
    last_intent: Option<String>,
}

impl FolioFieldApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_path: Option<PathBuf>,
        config: FieldConfig,
        initial_link: ShareState,
        initial_mode: ViewMode,
    ) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            config,
            initial_link,
            initial_mode,
            state,
        }
    }

    fn spawn_load(data_path: Option<PathBuf>) -> Receiver<Result<Portfolio, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match &data_path {
                Some(path) => Portfolio::load(path),
                None => Portfolio::from_json(SAMPLE_PORTFOLIO),
            };
            let _ = tx.send(result.map_err(|error| format!("{error:#}")));
        });

        rx
    }

    fn start_load(data_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }

    fn ready(&self, portfolio: Portfolio) -> AppState {
        let today = chrono::Local::now().date_naive();
        let mut field = Field::mount(portfolio, self.config.clone(), today);
        field.set_share_state(self.initial_link.clone());
        AppState::Ready(Box::new(ViewModel {
            field,
            mode: self.initial_mode,
            link: self.initial_link.clone(),
            query_input: self.initial_link.query.clone().unwrap_or_default(),
            link_input: self.initial_link.to_search(),
            sphere_spin: 0.0,
            dragging: false,
            last_intent: None,
        }))
    }
}

impl eframe::App for FolioFieldApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut loaded = None;
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    loaded = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading portfolio...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load portfolio");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        match loaded {
            Some(Ok(portfolio)) => {
                tracing::info!(items = portfolio.items.len(), "portfolio loaded");
                transition = Some(self.ready(portfolio));
            }
            Some(Err(error)) => {
                tracing::error!(%error, "portfolio load failed");
                transition = Some(AppState::Error(error));
            }
            None => {}
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn show(&mut self, ctx: &Context) {
        let portfolio = self.field.portfolio();
        let summary = format!(
            "items: {} | nodes: {} | months: {}",
            portfolio.items.len(),
            self.field.simulation().len(),
            self.field.summary().total_months
        );

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("folio-field");
                    ui.separator();
                    ui.selectable_value(&mut self.mode, ViewMode::Field, "Field");
                    ui.selectable_value(&mut self.mode, ViewMode::Sphere, "Sphere");
                    ui.separator();
                    ui.label(summary);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let link = self.link.to_search();
                        ui.monospace(if link.is_empty() {
                            "?".to_owned()
                        } else {
                            format!("?{link}")
                        });
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| match self.mode {
            ViewMode::Field => self.draw_field(ui),
            ViewMode::Sphere => self.draw_sphere(ui),
        });

        for event in self.field.drain_events() {
            match event {
                FieldEvent::SelectionIntent(intent) => {
                    self.last_intent = Some(match &intent {
                        SelectionIntent::ToggleItem(name) => format!("toggle item {name}"),
                        SelectionIntent::ToggleCategory(category) => {
                            format!("toggle category {}", category.label())
                        }
                    });
                    let next = self.link.toggled(&intent, self.field.portfolio());
                    self.navigate(next);
                }
                other => tracing::debug!(event = ?other, "field event"),
            }
        }
    }

    /// Applies an intent the way the router would, then feeds the new share
    /// state back into the field.
    fn navigate(&mut self, link: ShareState) {
        if link == self.link {
            return;
        }
        self.link = link;
        self.link_input = self.link.to_search();
        self.query_input = self.link.query.clone().unwrap_or_default();
        self.field.set_share_state(self.link.clone());
    }
}
