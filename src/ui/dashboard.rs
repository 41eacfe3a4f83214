use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::aggregate::{top_sellers_by_count, top_sellers_by_revenue, DashboardTables};
use crate::data::format::{format_number, round2};
use crate::state::{AppState, DashboardTab};
use crate::ui::plot;

/// Central panel of the dashboard page: metrics and charts per tab.
pub fn dashboard_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("SALES DASHBOARD 🛒");
    ui.separator();

    let dash = &mut state.dashboard;
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut dash.tab, DashboardTab::Revenue, "Revenue");
        ui.selectable_value(&mut dash.tab, DashboardTab::SalesCount, "Sales count");
        ui.selectable_value(&mut dash.tab, DashboardTab::Sellers, "Sellers");
    });
    ui.separator();

    if dash.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No sales loaded  (File → Reload, or File → Open…)");
        });
        return;
    }

    let showing = match &dash.loaded_query {
        Some(query) => format!("Showing: {query}"),
        None => "Showing: local file".to_string(),
    };
    ui.label(RichText::new(showing).weak());

    if dash.tab == DashboardTab::Sellers {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Number of sellers");
            let bounds = state.config.top_sellers_min..=state.config.top_sellers_max;
            ui.add(egui::DragValue::new(&mut dash.top_k).range(bounds));
        });
    }

    let tables = &dash.tables;
    let top_k = dash.top_k;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match dash.tab {
            DashboardTab::Revenue => revenue_tab(ui, tables),
            DashboardTab::SalesCount => count_tab(ui, tables),
            DashboardTab::Sellers => sellers_tab(ui, tables, top_k),
        });
}

fn revenue_metric(ui: &mut Ui, tables: &DashboardTables) {
    plot::metric(ui, "Revenue", &format_number(round2(tables.total_revenue), "R$"));
}

fn count_metric(ui: &mut Ui, tables: &DashboardTables) {
    plot::metric(ui, "Sales count", &format_number(tables.sale_count as f64, ""));
}

fn revenue_tab(ui: &mut Ui, tables: &DashboardTables) {
    ui.columns(2, |cols: &mut [Ui]| {
        revenue_metric(&mut cols[0], tables);
        plot::location_map(&mut cols[0], "revenue_map", "Revenue by state", &tables.revenue_by_location);
        plot::location_bars(
            &mut cols[0],
            "revenue_states",
            "Top states (revenue)",
            "Revenue",
            &tables.revenue_by_location,
        );

        count_metric(&mut cols[1], tables);
        plot::monthly_lines(&mut cols[1], "revenue_monthly", "Monthly revenue", "Revenue", &tables.revenue_by_month);
        plot::category_bars(
            &mut cols[1],
            "revenue_categories",
            "Revenue by category",
            "Revenue",
            &tables.revenue_by_category,
        );
    });
}

fn count_tab(ui: &mut Ui, tables: &DashboardTables) {
    // Largest first for the bar chart; the map does not care about order.
    let mut by_state = tables.count_by_location.clone();
    by_state.sort_by(|a, b| b.value.cmp(&a.value));

    ui.columns(2, |cols: &mut [Ui]| {
        revenue_metric(&mut cols[0], tables);
        plot::location_map(&mut cols[0], "count_map", "Sales count by state", &tables.count_by_location);
        plot::location_bars(&mut cols[0], "count_states", "Top states (sales count)", "Sales count", &by_state);

        count_metric(&mut cols[1], tables);
        plot::monthly_lines(&mut cols[1], "count_monthly", "Monthly sales count", "Sales count", &tables.count_by_month);
        plot::category_bars(
            &mut cols[1],
            "count_categories",
            "Sales count by category",
            "Sales count",
            &tables.count_by_category,
        );
    });
}

fn sellers_tab(ui: &mut Ui, tables: &DashboardTables, top_k: usize) {
    let by_revenue: Vec<(&str, f64)> = top_sellers_by_revenue(&tables.sellers, top_k)
        .into_iter()
        .map(|s| (s.seller.as_str(), s.revenue))
        .collect();
    let by_count: Vec<(&str, f64)> = top_sellers_by_count(&tables.sellers, top_k)
        .into_iter()
        .map(|s| (s.seller.as_str(), s.count as f64))
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        revenue_metric(&mut cols[0], tables);
        plot::seller_bars(
            &mut cols[0],
            "sellers_revenue",
            &format!("Top {top_k} sellers (revenue)"),
            "Revenue",
            &by_revenue,
        );

        count_metric(&mut cols[1], tables);
        plot::seller_bars(
            &mut cols[1],
            "sellers_count",
            &format!("Top {top_k} sellers (sales)"),
            "Sales count",
            &by_count,
        );
    });
}
