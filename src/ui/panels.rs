use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, PLACEHOLDER};

// ---------------------------------------------------------------------------
// Left side panel – country selector and data table
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Country");
    ui.separator();

    match &state.dataset {
        None => {
            ui.label(if state.is_loading() {
                "Loading…"
            } else {
                "No dataset loaded."
            });
            return;
        }
        Some(ds) if ds.is_empty() => {
            ui.label("The file has no rows.");
            return;
        }
        Some(_) => {}
    }

    let entries: Vec<String> = state
        .dropdown_entries()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let current = state.selected_country.clone();

    let mut choice = None;
    egui::ComboBox::from_id_salt("country_select")
        .selected_text(current.as_deref().unwrap_or(PLACEHOLDER))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for (i, entry) in entries.iter().enumerate() {
                // Entry 0 is the placeholder.
                let value = (i > 0).then(|| entry.clone());
                if ui.selectable_label(current == value, entry).clicked() {
                    choice = Some(value);
                }
            }
        });
    if let Some(value) = choice {
        state.select_country(value);
    }

    ui.separator();
    observation_table(ui, state);
}

/// Year / emissions rows of the current selection.
fn observation_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    if state.selected_country.is_none() {
        return;
    }
    if state.visible_indices.is_empty() {
        ui.label("No non-zero observations.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(48.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Year");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Emissions");
            });
        })
        .body(|body| {
            body.rows(18.0, state.visible_indices.len(), |mut row| {
                let Some(obs) = dataset.get(state.visible_indices[row.index()]) else {
                    return;
                };
                let highlighted = state.hovered == Some(state.visible_indices[row.index()]);
                row.col(|ui: &mut Ui| {
                    let year = obs.year.map(|y| y.to_string()).unwrap_or_else(|| "–".into());
                    let mut text = RichText::new(year);
                    if highlighted {
                        text = text.strong().color(state.point_color);
                    }
                    ui.label(text);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(crate::chart::format_number(obs.greenhouse_gas_emissions));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(path) = &state.source_path {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ui.label(RichText::new(name).strong());
        }

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} observations, {} countries, {} shown",
                ds.len(),
                ds.countries().len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if ui
            .add_enabled(
                !state.chart.transform.is_identity(),
                egui::Button::new("Reset zoom"),
            )
            .clicked()
        {
            state.reset_zoom();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().weak_text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let ctx = ctx.clone();
        state.start_loading(path, move || ctx.request_repaint());
    }
}
