use std::time::Instant;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::loader::HttpSource;
use crate::state::{AppState, Page, SUCCESS_MESSAGE_TTL};
use crate::ui::{dashboard, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        let source = HttpSource::new(&config);
        Self {
            state: AppState::new(config, Box::new(source)),
        }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Load whatever the visible page is missing, then drop stale messages.
        self.state.refresh();
        self.state.expire_status(Instant::now());
        if self.state.status.as_ref().is_some_and(|msg| !msg.is_error) {
            ctx.request_repaint_after(SUCCESS_MESSAGE_TTL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| match self.state.page {
                Page::Dashboard => panels::dashboard_side_panel(ui, &mut self.state),
                Page::RawData => panels::raw_side_panel(ui, &mut self.state),
            });

        // ---- Central panel: charts or table ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Dashboard => dashboard::dashboard_page(ui, &mut self.state),
            Page::RawData => table::raw_data_page(ui, &mut self.state),
        });
    }
}
