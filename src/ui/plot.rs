use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Points};

use crate::color;
use crate::data::aggregate::ScatterPoint;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – charts
// ---------------------------------------------------------------------------

/// Render the chart column: heatmap, age histogram, fare-vs-age scatter.
pub fn charts(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Passengers and survival");
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("🚢 Survival by port × class");
            port_class_heatmap(ui, state);
            ui.separator();

            ui.strong("👶 Age distribution by outcome");
            age_histogram(ui, state);
            ui.separator();

            ui.strong("💰 Fare vs age");
            fare_age_scatter(ui, state);
        });
}

fn no_data(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(format!("ℹ {message}")).italics());
}

/// Pivot of Embarked (rows) × Pclass (columns) drawn as coloured cells.
fn port_class_heatmap(ui: &mut Ui, state: &AppState) {
    let pivot = &state.dashboard.port_by_class;
    if pivot.is_empty() {
        no_data(ui, "No data (check the filters)");
        return;
    }

    egui::Grid::new("port_class_heatmap")
        .spacing([6.0, 6.0])
        .min_col_width(70.0)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &pivot.columns {
                ui.strong(format!("Class {col}"));
            }
            ui.end_row();

            for row in &pivot.rows {
                ui.strong(format!("Port {row}"));
                for col in &pivot.columns {
                    match pivot.get(row, col) {
                        Some(rate) => {
                            ui.label(
                                RichText::new(format!("  {rate:.1}%  "))
                                    .monospace()
                                    .background_color(color::rate_color(rate))
                                    .color(color::rate_text_color(rate)),
                            );
                        }
                        None => {
                            ui.label(RichText::new("  –  ").weak());
                        }
                    }
                }
                ui.end_row();
            }
        });
}

/// Overlaid histograms of survivors and casualties over age.
fn age_histogram(ui: &mut Ui, state: &AppState) {
    let hist = &state.dashboard.age_histogram;
    if hist.is_empty() {
        no_data(ui, "Not enough age data");
        return;
    }

    let width = hist.bin_width();
    let series = |survived: bool| {
        let bars: Vec<Bar> = hist
            .bins
            .iter()
            .map(|bin| {
                let count = if survived { bin.survived } else { bin.died };
                Bar::new((bin.start + bin.end) / 2.0, count as f64).width(width)
            })
            .collect();
        BarChart::new(bars)
            .name(series_name(survived))
            .color(color::outcome_color(survived).gamma_multiply(0.6))
    };

    Plot::new("age_histogram")
        .height(260.0)
        .legend(Legend::default())
        .x_axis_label("Age")
        .y_axis_label("Passengers")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(series(false));
            plot_ui.bar_chart(series(true));
        });
}

/// Scatter of fare against age; hovering a point shows class, sex and port.
fn fare_age_scatter(ui: &mut Ui, state: &AppState) {
    let points = &state.dashboard.scatter;
    if points.is_empty() {
        no_data(ui, "Not enough data for the scatter plot");
        return;
    }

    let series = |survived: bool| {
        let xy: PlotPoints = points
            .iter()
            .filter(|p| p.survived == survived)
            .map(|p| [p.age, p.fare])
            .collect();
        Points::new(xy)
            .name(series_name(survived))
            .color(color::outcome_color(survived))
            .radius(2.5)
    };

    let hover_points = points.clone();
    Plot::new("fare_age_scatter")
        .height(300.0)
        .legend(Legend::default())
        .x_axis_label("Age")
        .y_axis_label("Fare")
        .label_formatter(move |name, value| hover_label(&hover_points, name, value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(series(false));
            plot_ui.points(series(true));
        });
}

fn hover_label(points: &[ScatterPoint], name: &str, value: &PlotPoint) -> String {
    let base = format!("Age {:.1}\nFare {:.2}", value.x, value.y);
    if name.is_empty() {
        return base;
    }
    match nearest_point(points, name, value) {
        Some(p) => {
            let port = p.embarked.map_or_else(|| "?".to_string(), |e| e.to_string());
            format!(
                "{name}\n{base}\nClass {} · {} · Port {port}",
                p.passenger_class, p.sex
            )
        }
        None => format!("{name}\n{base}"),
    }
}

/// Relative distance under which a plot position counts as a data point.
const HOVER_TOLERANCE: f64 = 1e-6;

/// The point of series `name` closest to `value`, if it lies within
/// [`HOVER_TOLERANCE`] on both axes. Plot coordinates pass through `f32`
/// screen space, so exact float equality misses.
fn nearest_point<'a>(
    points: &'a [ScatterPoint],
    name: &str,
    value: &PlotPoint,
) -> Option<&'a ScatterPoint> {
    let close = |a: f64, b: f64| (a - b).abs() <= HOVER_TOLERANCE * a.abs().max(b.abs()).max(1.0);

    points
        .iter()
        .filter(|p| series_name(p.survived) == name)
        .filter(|p| close(p.age, value.x) && close(p.fare, value.y))
        .min_by(|a, b| {
            let da = (a.age - value.x).hypot(a.fare - value.y);
            let db = (b.age - value.x).hypot(b.fare - value.y);
            da.total_cmp(&db)
        })
}

fn series_name(survived: bool) -> &'static str {
    if survived {
        "Survived"
    } else {
        "Died"
    }
}
