use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::export::export_file_name;
use crate::data::model::Column;
use crate::state::AppState;

/// Central panel of the raw-data page: column chooser, table, CSV export.
pub fn raw_data_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("RAW DATA");
    ui.separator();

    if state.raw.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No sales loaded  (File → Reload, or File → Open…)");
        });
        return;
    }

    egui::CollapsingHeader::new(RichText::new("Columns").strong())
        .id_salt("raw_columns")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for column in Column::ALL {
                    let mut shown = state.raw.columns.contains(&column);
                    if ui.checkbox(&mut shown, column.label()).changed() {
                        state.raw.toggle_column(column);
                    }
                }
            });
        });

    let table = &state.raw.table;
    ui.label(format!(
        "The table has {} rows and {} columns",
        table.row_count(),
        table.column_count()
    ));

    // ---- Export ----
    ui.add_space(4.0);
    let mut download = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("File name:");
        ui.text_edit_singleline(&mut state.raw.file_name);
        download = ui.button("Download table as CSV").clicked();
    });
    if download {
        save_dialog(state);
    }
    ui.separator();

    data_table(ui, state);
}

fn save_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save table as CSV")
        .set_file_name(export_file_name(&state.raw.file_name))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_csv(&path);
    }
}

fn data_table(ui: &mut Ui, state: &AppState) {
    let table = &state.raw.table;
    if table.columns.is_empty() {
        ui.label("No columns selected.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(TableColumn::auto().at_least(60.0), table.column_count())
        .header(22.0, |mut header| {
            for column in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(column.label());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.row_count(), |mut row| {
                let cells = &table.rows[row.index()];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell.to_string());
                    });
                }
            });
        });
}
