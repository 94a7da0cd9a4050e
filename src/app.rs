use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TitanicApp {
    pub state: AppState,
}

impl TitanicApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TitanicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Metrics column ----
        egui::SidePanel::left("metrics_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::metrics_panel(ui, &self.state);
            });

        // ---- Right side panel: rankings ----
        egui::SidePanel::right("summary_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                tables::summary_panel(ui, &self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::charts(ui, &self.state);
        });
    }
}
