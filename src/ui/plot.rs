use std::collections::BTreeMap;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::{CategoryTotal, LocationTotal, Measure, MonthlyTotal};

const CHART_HEIGHT: f32 = 260.0;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// A big-number tile: small caption above a large value.
pub fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
    ui.add_space(8.0);
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(6.0);
    ui.strong(title);
}

// ---------------------------------------------------------------------------
// Location charts
// ---------------------------------------------------------------------------

/// Bubble map: one point per location at (lon, lat), area proportional to its value.
pub fn location_map<M: Measure>(ui: &mut Ui, id: &str, title: &str, rows: &[LocationTotal<M>]) {
    chart_title(ui, title);
    let max = rows.iter().map(|r| r.value.as_f64()).fold(0.0, f64::max);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("lon")
        .y_axis_label("lat")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for r in rows {
                let share = if max > 0.0 { r.value.as_f64() / max } else { 0.0 };
                let points = Points::new(vec![[r.lon, r.lat]])
                    .name(format!("{}: {:.2}", r.location, r.value.as_f64()))
                    .radius(3.0 + 18.0 * share.sqrt() as f32)
                    .color(BAR_COLOR.gamma_multiply(0.7))
                    .filled(true);
                plot_ui.points(points);
            }
        });
}

/// Vertical bars per location, in the order given.
pub fn location_bars<M: Measure>(ui: &mut Ui, id: &str, title: &str, y_label: &str, rows: &[LocationTotal<M>]) {
    let bars = rows
        .iter()
        .map(|r| (r.location.clone(), r.value.as_f64()))
        .collect();
    bar_chart(ui, id, title, y_label, bars);
}

// ---------------------------------------------------------------------------
// Monthly lines
// ---------------------------------------------------------------------------

/// One line per year over months 1..=12, with markers.
pub fn monthly_lines<M: Measure>(ui: &mut Ui, id: &str, title: &str, y_label: &str, rows: &[MonthlyTotal<M>]) {
    chart_title(ui, title);

    let mut by_year: BTreeMap<i32, Vec<[f64; 2]>> = BTreeMap::new();
    for r in rows {
        by_year
            .entry(r.year)
            .or_default()
            .push([f64::from(r.month), r.value.as_f64()]);
    }
    let colors = ColorMap::new(by_year.keys());
    let month_names: BTreeMap<u32, &'static str> = rows.iter().map(|r| (r.month, r.month_name)).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Month")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 3.0, 12.0]))
        .x_axis_formatter(move |mark: GridMark, _range| month_tick(&month_names, mark.value))
        .y_axis_label(y_label)
        .include_x(1.0)
        .include_x(12.0)
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (year, points) in &by_year {
                let color = colors.color_for(year);
                let name = year.to_string();
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(&name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(points.clone())
                        .name(&name)
                        .color(color)
                        .radius(3.5)
                        .filled(true),
                );
            }
        });
}

/// Month name for a whole-number tick that has data, empty otherwise.
fn month_tick(names: &BTreeMap<u32, &'static str>, value: f64) -> String {
    if value.fract() != 0.0 || !(1.0..=12.0).contains(&value) {
        return String::new();
    }
    names.get(&(value as u32)).map_or_else(String::new, |name| name.to_string())
}

// ---------------------------------------------------------------------------
// Category and seller bars
// ---------------------------------------------------------------------------

/// Bars per category, each in its own colour with a legend entry.
pub fn category_bars<M: Measure>(ui: &mut Ui, id: &str, title: &str, y_label: &str, rows: &[CategoryTotal<M>]) {
    chart_title(ui, title);
    let palette = generate_palette(rows.len());

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .include_y(0.0)
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (r, color)) in rows.iter().zip(palette).enumerate() {
                let bar = Bar::new(i as f64, r.value.as_f64())
                    .name(&r.category)
                    .width(0.7);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&r.category).color(color));
            }
        });
}

/// Horizontal bars, largest on top, one legend entry per seller.
pub fn seller_bars(ui: &mut Ui, id: &str, title: &str, x_label: &str, rows: &[(&str, f64)]) {
    chart_title(ui, title);
    let palette = generate_palette(rows.len());
    let n = rows.len();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .include_x(0.0)
        .show_y(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, ((seller, value), color)) in rows.iter().zip(palette).enumerate() {
                let bar = Bar::new((n - i) as f64, *value).name(*seller).width(0.7);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .horizontal()
                        .name(*seller)
                        .color(color),
                );
            }
        });
}

fn bar_chart(ui: &mut Ui, id: &str, title: &str, y_label: &str, bars: Vec<(String, f64)>) {
    chart_title(ui, title);
    let bars: Vec<Bar> = bars
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| Bar::new(i as f64, value).name(name).width(0.7))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .include_y(0.0)
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
        });
}
