use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use super::model::{CellValue, Column, InclusiveRange, SaleRecord, SalesDataset};

// ---------------------------------------------------------------------------
// Filter criteria: one optional predicate per filterable column
// ---------------------------------------------------------------------------

/// Selection state of every filter widget.
///
/// A `None` entry places no constraint on its column. A `Some` set keeps the
/// records whose value is in the set (an empty set keeps nothing); a `Some`
/// range keeps the records inside it (an inverted range keeps nothing).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub products: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
    pub price: Option<InclusiveRange<f64>>,
    pub freight: Option<InclusiveRange<f64>>,
    pub purchase_date: Option<InclusiveRange<NaiveDate>>,
    pub sellers: Option<BTreeSet<String>>,
    pub locations: Option<BTreeSet<String>>,
    pub ratings: Option<BTreeSet<u8>>,
    pub payment_types: Option<BTreeSet<String>>,
    pub installments: Option<BTreeSet<u32>>,
}

impl FilterCriteria {
    /// Initialise every predicate to the full observed domain (i.e., show everything).
    pub fn full_domain(dataset: &SalesDataset) -> Self {
        let d = &dataset.domains;
        Self {
            products: Some(d.products.clone()),
            categories: Some(d.categories.clone()),
            price: d.price,
            freight: d.freight,
            purchase_date: d.purchase_date,
            sellers: Some(d.sellers.clone()),
            locations: Some(d.locations.clone()),
            ratings: Some(d.ratings.clone()),
            payment_types: Some(d.payment_types.clone()),
            installments: Some(d.installments.clone()),
        }
    }

    /// Restrict to a set of sellers, where an empty selection means every seller.
    pub fn seller_focus(sellers: &BTreeSet<String>) -> Self {
        Self {
            sellers: (!sellers.is_empty()).then(|| sellers.clone()),
            ..Self::default()
        }
    }

    /// Whether a record satisfies every active predicate.
    pub fn matches(&self, r: &SaleRecord) -> bool {
        in_set(&self.products, &r.product)
            && in_set(&self.categories, &r.category)
            && in_range(&self.price, r.price)
            && in_range(&self.freight, r.freight)
            && in_range(&self.purchase_date, r.purchase_date)
            && in_set(&self.sellers, &r.seller)
            && in_set(&self.locations, &r.location)
            && in_set(&self.ratings, &r.rating)
            && in_set(&self.payment_types, &r.payment_type)
            && in_set(&self.installments, &r.installments)
    }
}

fn in_set<T: Ord>(allowed: &Option<BTreeSet<T>>, value: &T) -> bool {
    allowed.as_ref().map_or(true, |set| set.contains(value))
}

fn in_range<T: PartialOrd + Copy>(range: &Option<InclusiveRange<T>>, value: T) -> bool {
    range.as_ref().map_or(true, |r| r.contains(value))
}

/// Return indices of records that pass all active filters, in input order.
pub fn filtered_indices(dataset: &SalesDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Copy out the records that pass all active filters.
pub fn filter_records(records: &[SaleRecord], criteria: &FilterCriteria) -> Vec<SaleRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Filtered rows projected onto a column subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl FilteredTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Filter `dataset` and keep only `columns`.
///
/// Rows keep their input order, columns keep the selection order; a column
/// selected twice is kept once, at its first position.
pub fn apply(dataset: &SalesDataset, criteria: &FilterCriteria, columns: &[Column]) -> FilteredTable {
    let mut seen = HashSet::new();
    let columns: Vec<Column> = columns.iter().copied().filter(|c| seen.insert(*c)).collect();

    let rows = filtered_indices(dataset, criteria)
        .into_iter()
        .map(|i| {
            let r = &dataset.records[i];
            columns.iter().map(|&c| r.cell(c)).collect()
        })
        .collect();

    FilteredTable { columns, rows }
}
