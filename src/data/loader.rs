use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{SaleRecord, SalesDataset};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a sales table could not be produced.
///
/// `Unavailable` covers every transport and HTTP status failure so the UI can
/// tell "the endpoint did not answer" apart from "nothing matched".
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sales data unavailable from {url}: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level JSON array of sales")]
    NotAnArray,
    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Regions offered by the endpoint. `Brasil` means "no region filter".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Brasil,
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brasil,
        Region::CentroOeste,
        Region::Nordeste,
        Region::Norte,
        Region::Sudeste,
        Region::Sul,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Brasil => "Brasil",
            Region::CentroOeste => "Centro-Oeste",
            Region::Nordeste => "Nordeste",
            Region::Norte => "Norte",
            Region::Sudeste => "Sudeste",
            Region::Sul => "Sul",
        }
    }

    /// Value of the `regiao` parameter: lowercase label, empty for the whole country.
    pub fn query_value(self) -> String {
        match self {
            Region::Brasil => String::new(),
            other => other.label().to_lowercase(),
        }
    }
}

/// Parameters of one request to the products endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesQuery {
    pub region: Region,
    /// `None` asks for every year.
    pub year: Option<i32>,
}

impl SalesQuery {
    pub fn params(&self) -> [(&'static str, String); 2] {
        [
            ("regiao", self.region.query_value()),
            ("ano", self.year.map(|y| y.to_string()).unwrap_or_default()),
        ]
    }
}

impl fmt::Display for SalesQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}, {year}", self.region.label()),
            None => write!(f, "{}, all years", self.region.label()),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Something that can produce a sales table for a query.
pub trait SalesSource {
    fn fetch(&self, query: &SalesQuery) -> Result<SalesDataset, LoadError>;
}

/// The remote products endpoint.
pub struct HttpSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl SalesSource for HttpSource {
    fn fetch(&self, query: &SalesQuery) -> Result<SalesDataset, LoadError> {
        let unavailable = |source| LoadError::Unavailable {
            url: self.endpoint.clone(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(unavailable)?;

        log::info!("GET {} {:?}", self.endpoint, query.params());
        let body = client
            .get(&self.endpoint)
            .query(&query.params())
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(unavailable)?;

        parse_sales_json(&body)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Load a JSON file in the endpoint's schema.
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sales_json(&text)
}

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "Produto": "Modelagem preditiva",
///     "Categoria do Produto": "livros",
///     "Preço": 92.45,
///     "Frete": 5.61,
///     "Data da Compra": "01/01/2020",
///     "Vendedor": "Thiago Silva",
///     "Local da compra": "BA",
///     "Avaliação da compra": 1,
///     "Tipo de pagamento": "cartao_credito",
///     "Quantidade de parcelas": 3,
///     "lat": -13.29,
///     "lon": -41.71
///   },
///   ...
/// ]
/// ```
pub fn parse_sales_json(text: &str) -> Result<SalesDataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let JsonValue::Array(rows) = root else {
        return Err(LoadError::NotAnArray);
    };

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value::<SaleRecord>(row)
                .map_err(|source| LoadError::Record { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SalesDataset::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::date;

    const TWO_SALES: &str = r#"[
        {"Produto": "Smart TV", "Categoria do Produto": "eletronicos", "Preço": 2190.0,
         "Frete": 110.5, "Data da Compra": "28/01/2021", "Vendedor": "Ana Duarte",
         "Local da compra": "SP", "Avaliação da compra": 5,
         "Tipo de pagamento": "cartao_credito", "Quantidade de parcelas": 10,
         "lat": -22.19, "lon": -48.79},
        {"Produto": "Mesa de jantar", "Categoria do Produto": "moveis", "Preço": 530.0,
         "Frete": 27.1, "Data da Compra": "31/12/2022", "Vendedor": "Maria Oliveira",
         "Local da compra": "MG", "Avaliação da compra": 3,
         "Tipo de pagamento": "boleto", "Quantidade de parcelas": 1,
         "lat": -18.1, "lon": -44.38}
    ]"#;

    #[test]
    fn parses_records_in_order() {
        let ds = parse_sales_json(TWO_SALES).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].product, "Smart TV");
        assert_eq!(ds.records[1].purchase_date, date(2022, 12, 31));
    }

    #[test]
    fn empty_array_is_an_empty_dataset() {
        let ds = parse_sales_json("[]").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn object_root_is_rejected() {
        assert!(matches!(
            parse_sales_json(r#"{"Produto": "x"}"#),
            Err(LoadError::NotAnArray)
        ));
    }

    #[test]
    fn bad_row_reports_its_index() {
        let text = TWO_SALES.replace("31/12/2022", "2022-12-31");
        match parse_sales_json(&text) {
            Err(LoadError::Record { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(parse_sales_json("[{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, TWO_SALES.as_bytes()).unwrap();
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.domains.sellers.len(), 2);
    }

    #[test]
    fn query_params_match_endpoint_contract() {
        let all = SalesQuery::default();
        assert_eq!(all.params(), [("regiao", String::new()), ("ano", String::new())]);

        let q = SalesQuery {
            region: Region::CentroOeste,
            year: Some(2022),
        };
        assert_eq!(
            q.params(),
            [("regiao", "centro-oeste".to_string()), ("ano", "2022".to_string())]
        );
    }

    #[test]
    fn query_describes_itself() {
        assert_eq!(SalesQuery::default().to_string(), "Brasil, all years");
        let q = SalesQuery {
            region: Region::Sul,
            year: Some(2021),
        };
        assert_eq!(q.to_string(), "Sul, 2021");
    }
}
