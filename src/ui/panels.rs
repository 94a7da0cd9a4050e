use std::collections::BTreeSet;
use std::fmt::Display;

use eframe::egui::{self, Color32, ProgressBar, RichText, ScrollArea, Slider, Ui};

use crate::color;
use crate::data::filter::{EmptySelection, RangeFilter};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter sidebar. Edits a copy of the current spec and hands the
/// result back to the state, which recomputes only when something changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🚢 Titanic Dashboard");
    ui.label(RichText::new("Adjust the filters to explore survival rates.").weak());
    ui.separator();

    ui.label(format!("Passengers: {}", state.dataset.len()));
    ui.separator();

    let dataset = &state.dataset;
    let mut spec = state.filters.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, "Sex", &dataset.sexes, &mut spec.sexes);
            multi_select(ui, "Pclass", &dataset.classes, &mut spec.classes);
            multi_select(ui, "Embarked", &dataset.ports, &mut spec.embarked_ports);

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Empty selection:");
                egui::ComboBox::from_id_salt("empty_selection")
                    .selected_text(match spec.empty_selection {
                        EmptySelection::MatchNone => "matches nobody",
                        EmptySelection::MatchAll => "matches everyone",
                    })
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(
                            &mut spec.empty_selection,
                            EmptySelection::MatchNone,
                            "matches nobody",
                        );
                        ui.selectable_value(
                            &mut spec.empty_selection,
                            EmptySelection::MatchAll,
                            "matches everyone",
                        );
                    });
            });
            ui.separator();

            ui.checkbox(&mut spec.include_missing_age, "Include passengers without age");
            if let Some(bounds) = dataset.age_bounds {
                ui.strong("Age");
                spec.age_range = range_sliders(ui, spec.age_range, bounds, Some(1.0));
            }

            if let Some(bounds) = dataset.fare_bounds {
                ui.strong("Fare");
                spec.fare_range = range_sliders(ui, spec.fare_range, bounds, None);
            }
        });

    state.set_filters(spec);
}

/// Checkbox list with All / None shortcuts, in a collapsible section.
fn multi_select<T: Ord + Clone + Display>(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<T>,
    selected: &mut BTreeSet<T>,
) {
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = all_values.clone();
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                }
            }
        });
}

/// Two sliders for an inclusive range. Crossing handles are reordered.
fn range_sliders(
    ui: &mut Ui,
    range: RangeFilter,
    bounds: (f64, f64),
    step: Option<f64>,
) -> RangeFilter {
    let (mut lo, mut hi) = (range.min, range.max);
    let mut min_slider = Slider::new(&mut lo, bounds.0..=bounds.1).text("min");
    let mut max_slider = Slider::new(&mut hi, bounds.0..=bounds.1).text("max");
    if let Some(step) = step {
        min_slider = min_slider.step_by(step);
        max_slider = max_slider.step_by(step);
    }
    ui.add(min_slider);
    ui.add(max_slider);
    RangeFilter::clamped(lo, hi, bounds)
}

// ---------------------------------------------------------------------------
// Metrics column
// ---------------------------------------------------------------------------

/// Headline counts, per-sex survival and the overall gauge.
pub fn metrics_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("🎯 Key metrics");
    ui.separator();

    let summary = &state.dashboard.summary;
    metric(ui, "Passengers", &summary.total.to_string());
    metric(ui, "Survivors", &summary.survived.to_string());
    metric(ui, "Casualties", &summary.died.to_string());
    ui.separator();

    for entry in &state.dashboard.rate_by_sex.entries {
        metric(
            ui,
            &format!("{} survival", capitalize(&entry.key.to_string())),
            &format!("{:.1}%", entry.rate),
        );
    }
    ui.separator();

    ui.strong("Overall survival (%)");
    ui.add(
        ProgressBar::new((summary.rate / 100.0) as f32)
            .text(format!("{:.1}%", summary.rate))
            .fill(color::gauge_color(summary.rate)),
    );
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
    ui.add_space(4.0);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Filters", |ui: &mut Ui| {
            if ui.button("Load preset…").clicked() {
                load_preset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save preset…").clicked() {
                save_preset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reset").clicked() {
                state.reset_filters();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} passengers loaded, {} match",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn load_preset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load filter preset")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_preset(&path);
    }
}

fn save_preset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save filter preset")
        .add_filter("JSON", &["json"])
        .set_file_name("filters.json")
        .save_file();

    if let Some(path) = file {
        state.save_preset(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::capitalize;

    #[test]
    fn capitalizes_first_letter_only() {
        assert_eq!(capitalize("female"), "Female");
        assert_eq!(capitalize(""), "");
    }
}
