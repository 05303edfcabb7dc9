// Data model shared by the loader and the dashboard utilities
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A single typed CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    /// Numeric coercion used by the aggregation helpers.
    ///
    /// Follows the dashboard's `Number(value)` semantics: null and empty text are 0,
    /// booleans are 1/0, timestamps are epoch milliseconds and unparsable text is NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Scalar::Null => 0.0,
            Scalar::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Scalar::Number(n) => *n,
            Scalar::Timestamp(ts) => ts.timestamp_millis() as f64,
            Scalar::Text(s) => text_to_number(s),
        }
    }

    /// Null, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn text_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if radix_digits(trimmed).is_some() => radix_literal(trimmed),
        // Rust's float parser also accepts "inf" and "nan" spellings.
        _ if trimmed
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

// Unsigned `0x`/`0o`/`0b` literals, prefix in either case.
fn radix_digits(s: &str) -> Option<(u32, &str)> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, s.get(2..)?))
}

fn radix_literal(s: &str) -> f64 {
    let Some((radix, digits)) = radix_digits(s) else {
        return f64::NAN;
    };
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) if n.is_nan() => f.write_str("NaN"),
            Scalar::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

/// One parsed CSV row. Column names are shared with every other row of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Scalar>,
}

impl Row {
    /// Builds a row over a shared header. Values beyond the header are dropped;
    /// a short row simply lacks the trailing columns.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Scalar>) -> Self {
        values.truncate(columns.len());
        Row { columns, values }
    }

    /// Convenience constructor for ad-hoc rows (each row gets its own header).
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Scalar>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (columns, values): (Vec<String>, Vec<Scalar>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Row {
            columns: columns.into(),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .position(|column| column == key)
            .and_then(|pos| self.values.get(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every present value is blank (see [`Scalar::is_blank`]).
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(Scalar::is_blank)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Ordered, immutable rows of one CSV resource. Clones share storage.
pub type Dataset = Arc<[Row]>;

/// The nine datasets the cost-accounting dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DatasetKind {
    Products,
    Materials,
    Suppliers,
    Activities,
    Processes,
    Orders,
    CostRates,
    MaterialConsumption,
    ProcessConsumption,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 9] = [
        DatasetKind::Products,
        DatasetKind::Materials,
        DatasetKind::Suppliers,
        DatasetKind::Activities,
        DatasetKind::Processes,
        DatasetKind::Orders,
        DatasetKind::CostRates,
        DatasetKind::MaterialConsumption,
        DatasetKind::ProcessConsumption,
    ];

    pub fn filename(self) -> &'static str {
        match self {
            DatasetKind::Products => "bearing_products.csv",
            DatasetKind::Materials => "raw_materials.csv",
            DatasetKind::Suppliers => "suppliers.csv",
            DatasetKind::Activities => "activities.csv",
            DatasetKind::Processes => "production_processes.csv",
            DatasetKind::Orders => "sample_production_orders.csv",
            DatasetKind::CostRates => "cost_allocation_rates.csv",
            DatasetKind::MaterialConsumption => "material_consumption_details.csv",
            DatasetKind::ProcessConsumption => "process_consumption_details.csv",
        }
    }

    // ALL is declared in variant order.
    fn index(self) -> usize {
        self as usize
    }

    /// Field name of this dataset in [`Datasets`].
    pub fn field_name(self) -> &'static str {
        match self {
            DatasetKind::Products => "products",
            DatasetKind::Materials => "materials",
            DatasetKind::Suppliers => "suppliers",
            DatasetKind::Activities => "activities",
            DatasetKind::Processes => "processes",
            DatasetKind::Orders => "orders",
            DatasetKind::CostRates => "cost_rates",
            DatasetKind::MaterialConsumption => "material_consumption",
            DatasetKind::ProcessConsumption => "process_consumption",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Result of a bulk load: every dataset, by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datasets {
    pub products: Dataset,
    pub materials: Dataset,
    pub suppliers: Dataset,
    pub activities: Dataset,
    pub processes: Dataset,
    pub orders: Dataset,
    pub cost_rates: Dataset,
    pub material_consumption: Dataset,
    pub process_consumption: Dataset,
}

impl Datasets {
    /// Assembles the record from loaded datasets. Returns `None` if any kind is missing.
    pub fn from_loaded<I>(loaded: I) -> Option<Self>
    where
        I: IntoIterator<Item = (DatasetKind, Dataset)>,
    {
        let mut slots: [Option<Dataset>; 9] = Default::default();
        for (kind, dataset) in loaded {
            slots[kind.index()] = Some(dataset);
        }
        let [
            products,
            materials,
            suppliers,
            activities,
            processes,
            orders,
            cost_rates,
            material_consumption,
            process_consumption,
        ] = slots;
        Some(Datasets {
            products: products?,
            materials: materials?,
            suppliers: suppliers?,
            activities: activities?,
            processes: processes?,
            orders: orders?,
            cost_rates: cost_rates?,
            material_consumption: material_consumption?,
            process_consumption: process_consumption?,
        })
    }

    pub fn get(&self, kind: DatasetKind) -> &Dataset {
        match kind {
            DatasetKind::Products => &self.products,
            DatasetKind::Materials => &self.materials,
            DatasetKind::Suppliers => &self.suppliers,
            DatasetKind::Activities => &self.activities,
            DatasetKind::Processes => &self.processes,
            DatasetKind::Orders => &self.orders,
            DatasetKind::CostRates => &self.cost_rates,
            DatasetKind::MaterialConsumption => &self.material_consumption,
            DatasetKind::ProcessConsumption => &self.process_consumption,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DatasetKind, &Dataset)> {
        DatasetKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
