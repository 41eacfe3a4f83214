use std::collections::BTreeMap;
use std::ops::AddAssign;

use chrono::{Datelike, Month, NaiveDate};

use super::model::SaleRecord;

// ---------------------------------------------------------------------------
// Measures
// ---------------------------------------------------------------------------

/// What gets accumulated per group.
pub trait Measure: Copy + Default + AddAssign + PartialOrd {
    fn of(record: &SaleRecord) -> Self;

    fn as_f64(self) -> f64;
}

/// Revenue: `sum(price)`.
impl Measure for f64 {
    fn of(record: &SaleRecord) -> Self {
        record.price
    }

    fn as_f64(self) -> f64 {
        self
    }
}

/// Sales count: `count(records)`.
impl Measure for usize {
    fn of(_: &SaleRecord) -> Self {
        1
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

fn group_by<K, M, F>(records: &[SaleRecord], key: F) -> BTreeMap<K, M>
where
    K: Ord,
    M: Measure,
    F: Fn(&SaleRecord) -> K,
{
    let mut groups: BTreeMap<K, M> = BTreeMap::new();
    for r in records {
        *groups.entry(key(r)).or_default() += M::of(r);
    }
    groups
}

fn sort_descending<T, M: Measure>(rows: &mut [T], value: impl Fn(&T) -> M) {
    // Stable, so ties keep key order.
    rows.sort_by(|a, b| {
        value(b)
            .partial_cmp(&value(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ---------------------------------------------------------------------------
// By location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LocationTotal<M> {
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub value: M,
}

fn by_location<M: Measure>(records: &[SaleRecord]) -> Vec<LocationTotal<M>> {
    // First (lat, lon) seen for each location represents it on the map.
    let mut coords: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for r in records {
        coords.entry(r.location.as_str()).or_insert((r.lat, r.lon));
    }

    group_by::<_, M, _>(records, |r| r.location.clone())
        .into_iter()
        .map(|(location, value)| {
            let (lat, lon) = coords.get(location.as_str()).copied().unwrap_or_default();
            LocationTotal {
                location,
                lat,
                lon,
                value,
            }
        })
        .collect()
}

/// `sum(price)` per location, highest revenue first.
pub fn revenue_by_location(records: &[SaleRecord]) -> Vec<LocationTotal<f64>> {
    let mut rows = by_location::<f64>(records);
    sort_descending(&mut rows, |r| r.value);
    rows
}

/// Number of sales per location, in location order.
pub fn count_by_location(records: &[SaleRecord]) -> Vec<LocationTotal<usize>> {
    by_location::<usize>(records)
}

// ---------------------------------------------------------------------------
// By month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal<M> {
    /// Last day of the month, the bucket key.
    pub month_end: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub value: M,
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

fn by_month<M: Measure>(records: &[SaleRecord]) -> Vec<MonthlyTotal<M>> {
    group_by::<_, M, _>(records, |r| month_end(r.purchase_date))
        .into_iter()
        .map(|(end, value)| MonthlyTotal {
            month_end: end,
            year: end.year(),
            month: end.month(),
            month_name: month_name(end.month()),
            value,
        })
        .collect()
}

/// `sum(price)` per calendar month, oldest first. Months without sales are absent.
pub fn revenue_by_month(records: &[SaleRecord]) -> Vec<MonthlyTotal<f64>> {
    by_month(records)
}

/// Number of sales per calendar month, oldest first.
pub fn count_by_month(records: &[SaleRecord]) -> Vec<MonthlyTotal<usize>> {
    by_month(records)
}

// ---------------------------------------------------------------------------
// By category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal<M> {
    pub category: String,
    pub value: M,
}

fn by_category<M: Measure>(records: &[SaleRecord]) -> Vec<CategoryTotal<M>> {
    group_by::<_, M, _>(records, |r| r.category.clone())
        .into_iter()
        .map(|(category, value)| CategoryTotal { category, value })
        .collect()
}

/// `sum(price)` per category, highest revenue first.
pub fn revenue_by_category(records: &[SaleRecord]) -> Vec<CategoryTotal<f64>> {
    let mut rows = by_category::<f64>(records);
    sort_descending(&mut rows, |r| r.value);
    rows
}

/// Number of sales per category, in category order.
pub fn count_by_category(records: &[SaleRecord]) -> Vec<CategoryTotal<usize>> {
    by_category(records)
}

// ---------------------------------------------------------------------------
// By seller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SellerSummary {
    pub seller: String,
    pub revenue: f64,
    pub count: usize,
}

/// Revenue and sales count per seller, in seller order.
pub fn seller_summary(records: &[SaleRecord]) -> Vec<SellerSummary> {
    let revenue = group_by::<_, f64, _>(records, |r| r.seller.clone());
    let count = group_by::<_, usize, _>(records, |r| r.seller.clone());
    revenue
        .into_iter()
        .map(|(seller, revenue)| {
            let count = count.get(&seller).copied().unwrap_or_default();
            SellerSummary {
                seller,
                revenue,
                count,
            }
        })
        .collect()
}

/// The `k` sellers with the highest revenue.
pub fn top_sellers_by_revenue(summary: &[SellerSummary], k: usize) -> Vec<&SellerSummary> {
    let mut rows: Vec<&SellerSummary> = summary.iter().collect();
    sort_descending(&mut rows, |s| s.revenue);
    rows.truncate(k);
    rows
}

/// The `k` sellers with the most sales.
pub fn top_sellers_by_count(summary: &[SellerSummary], k: usize) -> Vec<&SellerSummary> {
    let mut rows: Vec<&SellerSummary> = summary.iter().collect();
    sort_descending(&mut rows, |s| s.count);
    rows.truncate(k);
    rows
}

// ---------------------------------------------------------------------------
// Everything the dashboard draws
// ---------------------------------------------------------------------------

/// Derived tables for one filtered table. Never mutates its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardTables {
    pub total_revenue: f64,
    pub sale_count: usize,
    pub revenue_by_location: Vec<LocationTotal<f64>>,
    pub revenue_by_month: Vec<MonthlyTotal<f64>>,
    pub revenue_by_category: Vec<CategoryTotal<f64>>,
    pub count_by_location: Vec<LocationTotal<usize>>,
    pub count_by_month: Vec<MonthlyTotal<usize>>,
    pub count_by_category: Vec<CategoryTotal<usize>>,
    pub sellers: Vec<SellerSummary>,
}

impl DashboardTables {
    pub fn compute(records: &[SaleRecord]) -> Self {
        Self {
            total_revenue: records.iter().map(|r| r.price).sum(),
            sale_count: records.len(),
            revenue_by_location: revenue_by_location(records),
            revenue_by_month: revenue_by_month(records),
            revenue_by_category: revenue_by_category(records),
            count_by_location: count_by_location(records),
            count_by_month: count_by_month(records),
            count_by_category: count_by_category(records),
            sellers: seller_summary(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{date, sale, sample_records};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn monthly_sum_and_count() {
        let records = vec![
            sale("a", 100.0, date(2023, 1, 3)),
            sale("b", 200.0, date(2023, 1, 31)),
            sale("c", 50.0, date(2023, 2, 14)),
        ];
        let revenue: Vec<_> = revenue_by_month(&records)
            .into_iter()
            .map(|m| (m.month_name, m.value))
            .collect();
        assert_eq!(revenue, vec![("January", 300.0), ("February", 50.0)]);

        let count: Vec<_> = count_by_month(&records)
            .into_iter()
            .map(|m| (m.month_name, m.value))
            .collect();
        assert_eq!(count, vec![("January", 2), ("February", 1)]);
    }

    #[test]
    fn months_are_bucketed_per_year() {
        let records = vec![
            sale("a", 10.0, date(2021, 1, 5)),
            sale("b", 20.0, date(2022, 1, 5)),
        ];
        let months = revenue_by_month(&records);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2021, 1));
        assert_eq!((months[1].year, months[1].month), (2022, 1));
    }

    #[test]
    fn month_end_handles_lengths() {
        assert_eq!(month_end(date(2020, 2, 10)), date(2020, 2, 29));
        assert_eq!(month_end(date(2021, 2, 1)), date(2021, 2, 28));
        assert_eq!(month_end(date(2022, 12, 31)), date(2022, 12, 31));
        assert_eq!(month_end(date(2022, 4, 30)), date(2022, 4, 30));
    }

    #[test]
    fn location_revenue_is_sorted_with_first_coordinates() {
        let records = sample_records();
        let rows = revenue_by_location(&records);
        let order: Vec<_> = rows.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(order, vec!["SP", "MG", "RJ"]);
        assert_relative_eq!(rows[0].value, 2190.0 + 92.45 + 1750.0);
        assert_eq!((rows[1].lat, rows[1].lon), (-18.1, -44.38));
    }

    #[test]
    fn location_count_is_in_key_order() {
        let rows = count_by_location(&sample_records());
        let got: Vec<_> = rows.iter().map(|r| (r.location.as_str(), r.value)).collect();
        assert_eq!(got, vec![("MG", 1), ("RJ", 1), ("SP", 3)]);
    }

    #[test]
    fn category_views() {
        let records = sample_records();
        let revenue = revenue_by_category(&records);
        assert_eq!(revenue[0].category, "eletronicos");
        assert_eq!(revenue[1].category, "moveis");
        assert_relative_eq!(revenue[1].value, 942.5);

        let count: Vec<_> = count_by_category(&records)
            .into_iter()
            .map(|c| (c.category, c.value))
            .collect();
        assert_eq!(
            count,
            vec![
                ("eletronicos".to_string(), 2),
                ("livros".to_string(), 1),
                ("moveis".to_string(), 2)
            ]
        );
    }

    #[test]
    fn seller_summary_and_top_k() {
        let summary = seller_summary(&sample_records());
        let names: Vec<_> = summary.iter().map(|s| s.seller.as_str()).collect();
        assert_eq!(names, vec!["Ana Duarte", "Maria Oliveira", "Thiago Silva"]);

        let top = top_sellers_by_revenue(&summary, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].seller, "Ana Duarte");
        assert_eq!(top[1].seller, "Thiago Silva");

        let by_count = top_sellers_by_count(&summary, 10);
        assert_eq!(by_count.len(), 3);
        assert_eq!(by_count[0].count, 2);
        assert_eq!(by_count[2].seller, "Maria Oliveira");
    }

    #[test]
    fn empty_input_has_no_groups() {
        let tables = DashboardTables::compute(&[]);
        assert_eq!(tables, DashboardTables::default());
    }

    fn arb_records() -> impl Strategy<Value = Vec<SaleRecord>> {
        let one = (
            prop::sample::select(vec!["moveis", "livros", "eletronicos", "brinquedos"]),
            prop::sample::select(vec!["SP", "RJ", "MG", "BA"]),
            0u32..100_000,
            0i64..1400,
        )
            .prop_map(|(category, location, cents, day)| SaleRecord {
                category: category.to_string(),
                location: location.to_string(),
                ..sale(
                    "p",
                    f64::from(cents) / 100.0,
                    date(2020, 1, 1) + chrono::Duration::days(day),
                )
            });
        prop::collection::vec(one, 0..60)
    }

    proptest! {
        #[test]
        fn category_revenue_conserves_total(records in arb_records()) {
            let total: f64 = records.iter().map(|r| r.price).sum();
            let grouped: f64 = revenue_by_category(&records).iter().map(|c| c.value).sum();
            prop_assert!((total - grouped).abs() < 1e-6);

            let counted: usize = count_by_month(&records).iter().map(|m| m.value).sum();
            prop_assert_eq!(counted, records.len());
        }

        #[test]
        fn aggregation_is_idempotent(records in arb_records()) {
            let before = records.clone();
            let first = DashboardTables::compute(&records);
            let second = DashboardTables::compute(&records);
            prop_assert_eq!(first, second);
            prop_assert_eq!(before, records);
        }
    }
}
