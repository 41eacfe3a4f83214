use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Date layout used by the sales endpoint (`Data da Compra`).
pub const PURCHASE_DATE_FORMAT: &str = "%d/%m/%Y";

// ---------------------------------------------------------------------------
// SaleRecord – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sale as delivered by the products endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "Produto")]
    pub product: String,
    #[serde(rename = "Categoria do Produto")]
    pub category: String,
    #[serde(rename = "Preço")]
    pub price: f64,
    #[serde(rename = "Frete")]
    pub freight: f64,
    #[serde(rename = "Data da Compra", deserialize_with = "purchase_date")]
    pub purchase_date: NaiveDate,
    #[serde(rename = "Vendedor")]
    pub seller: String,
    #[serde(rename = "Local da compra")]
    pub location: String,
    #[serde(rename = "Avaliação da compra")]
    pub rating: u8,
    #[serde(rename = "Tipo de pagamento")]
    pub payment_type: String,
    #[serde(rename = "Quantidade de parcelas")]
    pub installments: u32,
    pub lat: f64,
    pub lon: f64,
}

fn purchase_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), PURCHASE_DATE_FORMAT).map_err(|e| {
        serde::de::Error::custom(format!("invalid purchase date '{raw}': {e}"))
    })
}

impl SaleRecord {
    /// Read a single cell for table display and CSV export.
    pub fn cell(&self, column: Column) -> CellValue {
        match column {
            Column::Product => CellValue::Text(self.product.clone()),
            Column::Category => CellValue::Text(self.category.clone()),
            Column::Price => CellValue::Number(self.price),
            Column::Freight => CellValue::Number(self.freight),
            Column::PurchaseDate => CellValue::Date(self.purchase_date),
            Column::Seller => CellValue::Text(self.seller.clone()),
            Column::Location => CellValue::Text(self.location.clone()),
            Column::Rating => CellValue::Integer(i64::from(self.rating)),
            Column::PaymentType => CellValue::Text(self.payment_type.clone()),
            Column::Installments => CellValue::Integer(i64::from(self.installments)),
            Column::Lat => CellValue::Number(self.lat),
            Column::Lon => CellValue::Number(self.lon),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – the fixed schema
// ---------------------------------------------------------------------------

/// Columns of the sales table, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Product,
    Category,
    Price,
    Freight,
    PurchaseDate,
    Seller,
    Location,
    Rating,
    PaymentType,
    Installments,
    Lat,
    Lon,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Product,
        Column::Category,
        Column::Price,
        Column::Freight,
        Column::PurchaseDate,
        Column::Seller,
        Column::Location,
        Column::Rating,
        Column::PaymentType,
        Column::Installments,
        Column::Lat,
        Column::Lon,
    ];

    /// Header label, identical to the JSON field name.
    pub fn label(self) -> &'static str {
        match self {
            Column::Product => "Produto",
            Column::Category => "Categoria do Produto",
            Column::Price => "Preço",
            Column::Freight => "Frete",
            Column::PurchaseDate => "Data da Compra",
            Column::Seller => "Vendedor",
            Column::Location => "Local da compra",
            Column::Rating => "Avaliação da compra",
            Column::PaymentType => "Tipo de pagamento",
            Column::Installments => "Quantidade de parcelas",
            Column::Lat => "lat",
            Column::Lon => "lon",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single projected cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// ---------------------------------------------------------------------------
// InclusiveRange – closed [low, high] interval
// ---------------------------------------------------------------------------

/// A closed interval. An inverted range (`low > high`) contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InclusiveRange<T> {
    pub low: T,
    pub high: T,
}

impl<T: PartialOrd + Copy> InclusiveRange<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: T) -> bool {
        self.low <= value && value <= self.high
    }

    /// Smallest range covering every value, `None` for an empty iterator.
    pub fn spanning(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self::new(v, v)),
            Some(r) => Some(Self::new(
                if v < r.low { v } else { r.low },
                if v > r.high { v } else { r.high },
            )),
        })
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Observed domain of every filterable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domains {
    pub products: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sellers: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub ratings: BTreeSet<u8>,
    pub payment_types: BTreeSet<String>,
    pub installments: BTreeSet<u32>,
    pub price: Option<InclusiveRange<f64>>,
    pub freight: Option<InclusiveRange<f64>>,
    pub purchase_date: Option<InclusiveRange<NaiveDate>>,
}

/// The loaded sales table with pre-computed column domains.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    /// All sales, in the order they were received.
    pub records: Vec<SaleRecord>,
    pub domains: Domains,
}

impl SalesDataset {
    /// Build column domains from the loaded records.
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        let mut domains = Domains::default();
        for r in &records {
            domains.products.insert(r.product.clone());
            domains.categories.insert(r.category.clone());
            domains.sellers.insert(r.seller.clone());
            domains.locations.insert(r.location.clone());
            domains.ratings.insert(r.rating);
            domains.payment_types.insert(r.payment_type.clone());
            domains.installments.insert(r.installments);
        }
        domains.price = InclusiveRange::spanning(records.iter().map(|r| r.price));
        domains.freight = InclusiveRange::spanning(records.iter().map(|r| r.freight));
        domains.purchase_date = InclusiveRange::spanning(records.iter().map(|r| r.purchase_date));

        SalesDataset { records, domains }
    }

    /// Number of sales.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    pub fn sale(product: &str, price: f64, purchase_date: NaiveDate) -> SaleRecord {
        SaleRecord {
            product: product.to_string(),
            category: "eletronicos".to_string(),
            price,
            freight: price / 20.0,
            purchase_date,
            seller: "Ana Duarte".to_string(),
            location: "SP".to_string(),
            rating: 5,
            payment_type: "cartao_credito".to_string(),
            installments: 1,
            lat: -22.19,
            lon: -48.79,
        }
    }

    /// A small mixed table covering every column.
    pub fn sample_records() -> Vec<SaleRecord> {
        vec![
            SaleRecord {
                category: "moveis".to_string(),
                seller: "Thiago Silva".to_string(),
                location: "RJ".to_string(),
                lat: -22.25,
                lon: -42.66,
                rating: 4,
                installments: 8,
                ..sale("Cadeira de escritório", 412.5, date(2021, 1, 15))
            },
            sale("Smart TV", 2190.0, date(2021, 1, 28)),
            SaleRecord {
                category: "livros".to_string(),
                payment_type: "boleto".to_string(),
                rating: 1,
                ..sale("Modelagem preditiva", 92.45, date(2021, 2, 3))
            },
            SaleRecord {
                seller: "Thiago Silva".to_string(),
                installments: 3,
                ..sale("Celular Plus X42", 1750.0, date(2022, 2, 10))
            },
            SaleRecord {
                category: "moveis".to_string(),
                seller: "Maria Oliveira".to_string(),
                location: "MG".to_string(),
                lat: -18.1,
                lon: -44.38,
                rating: 3,
                payment_type: "boleto".to_string(),
                ..sale("Mesa de jantar", 530.0, date(2022, 12, 31))
            },
        ]
    }
}
