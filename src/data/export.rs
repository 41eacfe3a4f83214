use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::filter::FilteredTable;

/// Encode a projected table as UTF-8 CSV: header row of column labels, then one row per record.
pub fn encode_csv(table: &FilteredTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns.iter().map(|c| c.label()))
        .context("writing CSV header")?;
    for (i, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV buffer: {}", e.error()))
}

/// Append `.csv` to a user-typed name unless it is already there.
pub fn export_file_name(stem: &str) -> String {
    let stem = stem.trim();
    let stem = if stem.is_empty() { "dados" } else { stem };
    if stem.to_ascii_lowercase().ends_with(".csv") {
        stem.to_string()
    } else {
        format!("{stem}.csv")
    }
}

// ---------------------------------------------------------------------------
// CSV cache
// ---------------------------------------------------------------------------

/// Read-through cache of the last CSV encoding, keyed by the table it encodes.
#[derive(Debug, Default)]
pub struct CsvCache {
    source: Option<FilteredTable>,
    bytes: Vec<u8>,
}

impl CsvCache {
    /// Return the encoding of `table`, re-encoding only if its content changed.
    pub fn get_or_encode(&mut self, table: &FilteredTable) -> Result<&[u8]> {
        if self.source.as_ref() != Some(table) {
            log::debug!("encoding {} rows as CSV", table.row_count());
            self.bytes = encode_csv(table)?;
            self.source = Some(table.clone());
        }
        Ok(&self.bytes)
    }

    pub fn invalidate(&mut self) {
        self.source = None;
        self.bytes.clear();
    }
}

/// Write the table to `path` as CSV.
pub fn save_csv(cache: &mut CsvCache, table: &FilteredTable, path: &Path) -> Result<()> {
    let bytes = cache.get_or_encode(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Exported {} rows × {} columns to {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::fixtures::sample_records;
    use crate::data::model::{CellValue, Column, SalesDataset};

    fn table(columns: &[Column]) -> FilteredTable {
        let ds = SalesDataset::from_records(sample_records());
        apply(&ds, &FilterCriteria::default(), columns)
    }

    #[test]
    fn header_and_rows() {
        let t = table(&[Column::Product, Column::Price, Column::PurchaseDate]);
        let text = String::from_utf8(encode_csv(&t).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Produto,Preço,Data da Compra"));
        assert_eq!(lines.next(), Some("Cadeira de escritório,412.5,2021-01-15"));
        assert_eq!(text.lines().count(), 1 + 5);
    }

    #[test]
    fn empty_table_still_has_header() {
        let ds = SalesDataset::from_records(sample_records());
        let none = FilterCriteria {
            sellers: Some(Default::default()),
            ..FilterCriteria::default()
        };
        let t = apply(&ds, &none, &[Column::Seller]);
        assert_eq!(encode_csv(&t).unwrap(), b"Vendedor\n");
    }

    #[test]
    fn file_name_gets_suffix_once() {
        assert_eq!(export_file_name("dados"), "dados.csv");
        assert_eq!(export_file_name("vendas.csv"), "vendas.csv");
        assert_eq!(export_file_name("  "), "dados.csv");
    }

    #[test]
    fn cache_reencodes_only_on_change() {
        let mut cache = CsvCache::default();
        let wide = table(&Column::ALL);
        let first = cache.get_or_encode(&wide).unwrap().to_vec();
        assert_eq!(cache.get_or_encode(&wide).unwrap(), first.as_slice());

        let narrow = table(&[Column::Product]);
        let second = cache.get_or_encode(&narrow).unwrap().to_vec();
        assert_ne!(first, second);
        assert!(second.starts_with(b"Produto\n"));
    }

    #[test]
    fn cache_notices_a_single_changed_cell() {
        let mut cache = CsvCache::default();
        let original = table(&[Column::Product, Column::Price]);
        let before = cache.get_or_encode(&original).unwrap().to_vec();

        let mut edited = original.clone();
        edited.rows[0][1] = CellValue::Number(413.0);
        let after = cache.get_or_encode(&edited).unwrap().to_vec();
        assert_ne!(before, after);
        assert!(String::from_utf8(after).unwrap().contains("Cadeira de escritório,413\n"));

        // Re-encoding after invalidation gives the same bytes.
        cache.invalidate();
        assert_eq!(cache.get_or_encode(&original).unwrap(), before.as_slice());
    }

    #[test]
    fn saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name("dados"));
        let mut cache = CsvCache::default();
        save_csv(&mut cache, &table(&[Column::Location]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Local da compra\nRJ\n"));
    }
}
