use std::collections::BTreeSet;

use chrono::NaiveDate;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::Region;
use crate::data::model::InclusiveRange;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.dashboard.invalidate();
                state.raw.invalidate();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.page, Page::Dashboard, "Dashboard");
        ui.selectable_value(&mut state.page, Page::RawData, "Raw data");

        ui.separator();

        if let Some(msg) = &state.status {
            let color = if msg.is_error {
                Color32::RED
            } else {
                Color32::from_rgb(40, 160, 70)
            };
            let icon = if msg.is_error { "⚠" } else { "✅" };
            ui.label(RichText::new(format!("{icon} {}", msg.text)).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Dashboard side panel
// ---------------------------------------------------------------------------

/// Region / year / seller filters of the dashboard page.
pub fn dashboard_side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dash = &mut state.dashboard;
    let mut refetch = false;

    ui.strong("Region");
    egui::ComboBox::from_id_salt("region")
        .selected_text(dash.region.label())
        .show_ui(ui, |ui: &mut Ui| {
            for region in Region::ALL {
                refetch |= ui
                    .selectable_value(&mut dash.region, region, region.label())
                    .changed();
            }
        });

    ui.add_space(6.0);
    refetch |= ui
        .checkbox(&mut dash.all_years, "Data for the whole period")
        .changed();
    if !dash.all_years {
        let years = state.config.first_year..=state.config.last_year;
        // Fetch when the handle is released, not on every step of a drag.
        let slider = ui.add(egui::Slider::new(&mut dash.year, years).text("Year"));
        refetch |= slider.drag_stopped() || (slider.changed() && !slider.dragged());
    }
    if refetch {
        dash.invalidate();
    }

    ui.add_space(6.0);
    ui.separator();

    let Some(ds) = &dash.dataset else {
        ui.label("No data loaded.");
        return;
    };
    let sellers = ds.domains.sellers.clone();

    let header = if dash.sellers.is_empty() {
        "Sellers  (all)".to_string()
    } else {
        format!("Sellers  ({}/{})", dash.sellers.len(), sellers.len())
    };
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("dashboard_sellers")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                dash.clear_sellers();
            }
            ScrollArea::vertical()
                .max_height(320.0)
                .show(ui, |ui: &mut Ui| {
                    for seller in &sellers {
                        let mut checked = dash.sellers.contains(seller);
                        if ui.checkbox(&mut checked, seller).changed() {
                            dash.toggle_seller(seller);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Raw-data side panel
// ---------------------------------------------------------------------------

/// Render the raw-data filter panel: one collapsible widget per column.
pub fn raw_side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let raw = &mut state.raw;
    let dataset = match &raw.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No data loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let domains = dataset.domains.clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if ui.button("Reset filters").clicked() {
                raw.reset();
            }
            ui.separator();

            changed |= multiselect(ui, "Product", &domains.products, &mut raw.criteria.products);
            changed |= multiselect(ui, "Category", &domains.categories, &mut raw.criteria.categories);
            if let Some(bounds) = domains.price {
                changed |= range_slider(ui, "Price", bounds, &mut raw.criteria.price);
            }
            if let Some(bounds) = domains.freight {
                changed |= range_slider(ui, "Freight", bounds, &mut raw.criteria.freight);
            }
            if let Some(bounds) = domains.purchase_date {
                changed |= date_range(ui, "Purchase date", bounds, &mut raw.criteria.purchase_date);
            }
            changed |= multiselect(ui, "Seller", &domains.sellers, &mut raw.criteria.sellers);
            changed |= multiselect(ui, "Purchase location", &domains.locations, &mut raw.criteria.locations);
            changed |= multiselect(ui, "Rating", &domains.ratings, &mut raw.criteria.ratings);
            changed |= multiselect(ui, "Payment type", &domains.payment_types, &mut raw.criteria.payment_types);
            changed |= multiselect(ui, "Installments", &domains.installments, &mut raw.criteria.installments);
        });

    // Recompute the table after any widget change.
    if changed {
        raw.refilter();
    }
}

/// Checkbox list over a column's observed values. Returns whether the selection changed.
fn multiselect<T>(ui: &mut Ui, title: &str, all_values: &BTreeSet<T>, selected: &mut Option<BTreeSet<T>>) -> bool
where
    T: Ord + Clone + ToString,
{
    let mut changed = false;

    // Show count of selected / total in the header
    let n_total = all_values.len();
    let n_selected = selected.as_ref().map_or(n_total, |s| s.len());
    let header_text = format!("{title}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = Some(all_values.clone());
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    *selected = Some(BTreeSet::new());
                    changed = true;
                }
            });

            let selected = selected.get_or_insert_with(|| all_values.clone());
            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

/// Two sliders bounded by the observed range.
fn range_slider(
    ui: &mut Ui,
    title: &str,
    bounds: InclusiveRange<f64>,
    range: &mut Option<InclusiveRange<f64>>,
) -> bool {
    let mut changed = false;
    let current = range.get_or_insert(bounds);

    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let span = bounds.low..=bounds.high;
            changed |= ui
                .add(egui::Slider::new(&mut current.low, span.clone()).text("min"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut current.high, span).text("max"))
                .changed();
        });

    changed
}

/// Start / end date pickers, initialised to the observed range.
fn date_range(
    ui: &mut Ui,
    title: &str,
    bounds: InclusiveRange<NaiveDate>,
    range: &mut Option<InclusiveRange<NaiveDate>>,
) -> bool {
    let mut changed = false;
    let current = range.get_or_insert(bounds);

    egui::CollapsingHeader::new(RichText::new(title).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("from");
                changed |= ui
                    .add(egui_extras::DatePickerButton::new(&mut current.low).id_salt("date_from"))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("to");
                changed |= ui
                    .add(egui_extras::DatePickerButton::new(&mut current.high).id_salt("date_to"))
                    .changed();
            });
        });

    changed
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!("Loaded {} sales from {}", dataset.len(), path.display());
                state.open_dataset(dataset);
            }
            Err(e) => state.report_error(&e),
        }
    }
}
