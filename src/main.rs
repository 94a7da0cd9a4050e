mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::TitanicApp;
use config::Settings;
use data::aggregate::Dashboard;
use data::filter::{apply, FilterSpec};
use data::loader;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let settings = Settings::parse();

    let dataset = loader::load_file(&settings.data)
        .with_context(|| format!("loading passenger data from {}", settings.data.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;
    log::info!(
        "Loaded {} passengers (sexes {:?}, classes {:?}, ports {:?})",
        dataset.len(),
        dataset.sexes,
        dataset.classes,
        dataset.ports
    );

    let filters = match &settings.filters {
        Some(path) => FilterSpec::load_json(path)
            .with_context(|| format!("loading filter preset {}", path.display()))?,
        None => FilterSpec::unrestricted(&dataset),
    };

    if settings.summary {
        let view = apply(&dataset, &filters);
        let dashboard = Dashboard::compute(&view, &settings.dashboard());
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    let state = AppState::new(dataset, filters, settings.dashboard());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Titanic Survival Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(TitanicApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
