use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – year slider and country selection
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Arc clone so state can be mutated while iterating countries.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Year ----
    if let Some((min, max)) = dataset.year_range() {
        ui.strong("Year");
        let mut year = state.filter.as_ref().map_or(max, |f| f.year);
        if ui.add(egui::Slider::new(&mut year, min..=max)).changed() {
            state.set_year(year);
        }
        ui.separator();
    }

    // ---- Countries ----
    let n_selected = state.filter.as_ref().map_or(0, |f| f.countries.len());
    ui.strong(format!(
        "Countries  ({n_selected}/{})",
        dataset.countries.len()
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });
    ui.add(egui::TextEdit::singleline(&mut state.country_query).hint_text("Search…"));

    let query = state.country_query.to_lowercase();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for country in dataset
                .countries
                .iter()
                .filter(|c| c.to_lowercase().contains(&query))
            {
                let mut checked = state
                    .filter
                    .as_ref()
                    .is_some_and(|f| f.countries.contains(country));

                let mut text = RichText::new(country);
                if let Some(cm) = &state.color_map {
                    text = text.color(cm.color_for(country));
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_country(country);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open Parquet…").clicked() {
                open_parquet_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export Parquet…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        if ui.button("Reload").clicked() {
            state.reload();
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} countries, {} shown",
                ds.len(),
                ds.countries.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with gni.csv, lex.csv and pop.csv")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(path) = folder {
        state.open_path(&path);
    }
}

fn open_parquet_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open unified dataset")
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export unified dataset")
        .add_filter("Parquet", &["parquet"])
        .set_file_name("gapminder_data.parquet")
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
