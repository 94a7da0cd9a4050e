use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::RankedGroups;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Right panel – ranking tables and notes
// ---------------------------------------------------------------------------

pub fn summary_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("📌 Summary");
    ui.separator();

    let size = state.settings.rank_size;

    ui.strong(format!("🏆 Top {size} groups by survival"));
    if state.dashboard.is_empty() {
        ui.label(RichText::new("ℹ No data (check the filters)").italics());
    } else {
        ui.push_id("top_groups", |ui: &mut Ui| {
            ranking_table(ui, &state.dashboard.top_groups);
        });
        ui.add_space(8.0);

        ui.strong(format!("⚠ Bottom {size} groups by survival"));
        ui.push_id("bottom_groups", |ui: &mut Ui| {
            ranking_table(ui, &state.dashboard.bottom_groups);
        });
    }

    ui.separator();
    about(ui);
}

fn ranking_table(ui: &mut Ui, groups: &RankedGroups) {
    let n_keys = groups.keys.len();

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().at_least(50.0), n_keys)
        .column(Column::auto().at_least(40.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for key in &groups.keys {
                header.col(|ui: &mut Ui| {
                    ui.strong(key.label());
                });
            }
            header.col(|ui: &mut Ui| {
                ui.strong("N");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Survival %");
            });
        })
        .body(|mut body| {
            for group in &groups.rows {
                body.row(18.0, |mut row| {
                    for value in &group.key {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                    row.col(|ui: &mut Ui| {
                        ui.label(group.count.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.1}", group.rate));
                    });
                });
            }
        });
}

fn about(ui: &mut Ui) {
    egui::CollapsingHeader::new(RichText::new("ℹ About").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.hyperlink_to("Kaggle Titanic dataset", "https://www.kaggle.com/c/titanic");
            ui.label("Survived: 1 = survived, 0 = died");
            ui.label("Pclass: ticket class");
            ui.label("Sex, Age: passenger sex and age");
            ui.label("Fare: ticket fare");
            ui.label("Embarked: port (C, Q, S)");
        });
}
