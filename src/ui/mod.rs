/// Rendering only; every mutation goes through `AppState`.
pub mod dashboard;
pub mod panels;
pub mod plot;
pub mod table;
