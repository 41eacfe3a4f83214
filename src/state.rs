use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::DashboardConfig;
use crate::data::aggregate::DashboardTables;
use crate::data::export::{save_csv, CsvCache};
use crate::data::filter::{apply, filter_records, FilterCriteria, FilteredTable};
use crate::data::loader::{Region, SalesQuery, SalesSource};
use crate::data::model::{Column, SalesDataset};

/// How long a success message stays in the top bar.
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    RawData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Revenue,
    SalesCount,
    Sellers,
}

/// Status / error message shown in the top bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard page
// ---------------------------------------------------------------------------

pub struct DashboardState {
    pub region: Region,
    /// When set, the year slider is ignored and every year is requested.
    pub all_years: bool,
    pub year: i32,
    /// Focused sellers; empty means every seller.
    pub sellers: BTreeSet<String>,
    pub top_k: usize,
    pub tab: DashboardTab,
    /// Table returned by the endpoint for the current region/year.
    pub dataset: Option<SalesDataset>,
    /// Derived tables for the seller-focused rows (cached).
    pub tables: DashboardTables,
    /// Query that produced `dataset`; `None` for a table opened from disk.
    pub loaded_query: Option<SalesQuery>,
    needs_fetch: bool,
}

impl DashboardState {
    fn new(config: &DashboardConfig) -> Self {
        Self {
            region: Region::default(),
            all_years: true,
            year: config.first_year,
            sellers: BTreeSet::new(),
            top_k: config.top_sellers_default,
            tab: DashboardTab::default(),
            dataset: None,
            tables: DashboardTables::default(),
            loaded_query: None,
            needs_fetch: true,
        }
    }

    /// Parameters for the products endpoint.
    pub fn query(&self) -> SalesQuery {
        SalesQuery {
            region: self.region,
            year: (!self.all_years).then_some(self.year),
        }
    }

    /// Region or year changed: the table must be fetched again.
    pub fn invalidate(&mut self) {
        self.needs_fetch = true;
    }

    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        // Keep focused sellers that still exist.
        self.sellers.retain(|s| dataset.domains.sellers.contains(s));
        self.dataset = Some(dataset);
        self.loaded_query = None;
        self.needs_fetch = false;
        self.recompute();
    }

    /// Recompute `tables` after a seller-focus change.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.tables = DashboardTables::default();
            return;
        };
        let records = filter_records(&ds.records, &FilterCriteria::seller_focus(&self.sellers));
        log::debug!("dashboard: {} of {} sales in focus", records.len(), ds.len());
        self.tables = DashboardTables::compute(&records);
    }

    pub fn toggle_seller(&mut self, seller: &str) {
        if !self.sellers.remove(seller) {
            self.sellers.insert(seller.to_string());
        }
        self.recompute();
    }

    pub fn clear_sellers(&mut self) {
        self.sellers.clear();
        self.recompute();
    }
}

// ---------------------------------------------------------------------------
// Raw-data page
// ---------------------------------------------------------------------------

pub struct RawDataState {
    /// Unparameterised table from the endpoint.
    pub dataset: Option<SalesDataset>,
    pub criteria: FilterCriteria,
    /// Visible columns, in display order.
    pub columns: Vec<Column>,
    /// Rows passing `criteria`, projected onto `columns` (cached).
    pub table: FilteredTable,
    /// Export file name as typed, without the `.csv` suffix.
    pub file_name: String,
    pub csv_cache: CsvCache,
    needs_fetch: bool,
}

impl RawDataState {
    fn new(config: &DashboardConfig) -> Self {
        Self {
            dataset: None,
            criteria: FilterCriteria::default(),
            columns: Column::ALL.to_vec(),
            table: FilteredTable::default(),
            file_name: config.export_stem.clone(),
            csv_cache: CsvCache::default(),
            needs_fetch: true,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_fetch = true;
    }

    /// Ingest a newly loaded table; every filter starts at its full observed domain.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.criteria = FilterCriteria::full_domain(&dataset);
        self.dataset = Some(dataset);
        self.needs_fetch = false;
        self.csv_cache.invalidate();
        self.refilter();
    }

    /// Recompute `table` after a filter or column change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.table = apply(ds, &self.criteria, &self.columns);
        }
    }

    /// Show or hide a column. Re-shown columns go to the end.
    pub fn toggle_column(&mut self, column: Column) {
        if let Some(pos) = self.columns.iter().position(|&c| c == column) {
            self.columns.remove(pos);
        } else {
            self.columns.push(column);
        }
        self.refilter();
    }

    /// Back to every filter at its full domain and every column shown.
    pub fn reset(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::full_domain(ds);
        }
        self.columns = Column::ALL.to_vec();
        self.refilter();
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub page: Page,
    pub dashboard: DashboardState,
    pub raw: RawDataState,
    pub status: Option<StatusMessage>,
    source: Box<dyn SalesSource>,
}

impl AppState {
    pub fn new(config: DashboardConfig, source: Box<dyn SalesSource>) -> Self {
        Self {
            page: Page::default(),
            dashboard: DashboardState::new(&config),
            raw: RawDataState::new(&config),
            status: None,
            source,
            config,
        }
    }

    /// Fetch whatever the visible page is missing. Cheap when nothing is stale.
    pub fn refresh(&mut self) {
        match self.page {
            Page::Dashboard if self.dashboard.needs_fetch => {
                self.dashboard.needs_fetch = false;
                let query = self.dashboard.query();
                match self.source.fetch(&query) {
                    Ok(ds) => {
                        log::info!("Loaded {} sales for {query}", ds.len());
                        self.dashboard.set_dataset(ds);
                        self.dashboard.loaded_query = Some(query);
                        self.status = None;
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            Page::RawData if self.raw.needs_fetch => {
                self.raw.needs_fetch = false;
                match self.source.fetch(&SalesQuery::default()) {
                    Ok(ds) => {
                        log::info!("Loaded {} sales for the raw-data view", ds.len());
                        self.raw.set_dataset(ds);
                        self.status = None;
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            _ => {}
        }
    }

    /// Replace the data of both pages with a locally loaded table.
    pub fn open_dataset(&mut self, dataset: SalesDataset) {
        self.dashboard.set_dataset(dataset.clone());
        self.raw.set_dataset(dataset);
        self.status = None;
    }

    /// Write the raw-data table to `path`.
    pub fn export_csv(&mut self, path: &Path) {
        match save_csv(&mut self.raw.csv_cache, &self.raw.table, path) {
            Ok(()) => {
                self.status = Some(StatusMessage::success("File downloaded successfully!"));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status = Some(StatusMessage::error(format!("Error: {e:#}")));
            }
        }
    }

    /// Drop a success message once it has been shown long enough. Errors stay.
    pub fn expire_status(&mut self, now: Instant) {
        if let Some(msg) = &self.status {
            if !msg.is_error && now.duration_since(msg.shown_at) >= SUCCESS_MESSAGE_TTL {
                self.status = None;
            }
        }
    }

    pub fn report_error(&mut self, e: &dyn std::error::Error) {
        log::error!("Failed to load sales: {e}");
        self.status = Some(StatusMessage::error(format!("Error: {e}")));
    }
}
