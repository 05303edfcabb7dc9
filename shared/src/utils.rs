// Formatting and aggregation helpers used by the dashboard pages.
// Everything here is a pure function over already-loaded rows.
use crate::models::{Row, Scalar};
use std::collections::{HashMap, HashSet};

pub const CURRENCY_SYMBOL: &str = "¥";
pub const DEFAULT_CURRENCY_DECIMALS: usize = 2;
pub const DEFAULT_PERCENT_DECIMALS: usize = 1;
pub const DEFAULT_NUMBER_DECIMALS: usize = 0;

/// Group key used for rows that do not have the grouping column at all.
pub const MISSING_GROUP_KEY: &str = "undefined";

/// `¥1,234.50`. A missing value always renders as `¥0.00`.
pub fn format_currency(value: Option<f64>, decimals: usize) -> String {
    match value {
        None => format!("{}0.00", CURRENCY_SYMBOL),
        Some(v) => format!("{}{}", CURRENCY_SYMBOL, grouped_fixed(v, decimals)),
    }
}

/// `12.5%`. No digit grouping.
pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        None => "0%".to_string(),
        Some(v) => format!("{}%", fixed(v, decimals)),
    }
}

/// `1,234`.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        None => "0".to_string(),
        Some(v) => grouped_fixed(v, decimals),
    }
}

/// Gross margin in percent. Zero (or NaN) sales yield 0.
pub fn calculate_margin(cost: f64, sales: f64) -> f64 {
    if sales == 0.0 || sales.is_nan() {
        return 0.0;
    }
    (sales - cost) / sales * 100.0
}

// Fixed-point with exact ties rounded away from zero. Other values round to the
// nearest representation of their exact binary value.
fn fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    // The next float up lies strictly between the tie and the following one.
    let rounded = if is_exact_tie(magnitude, decimals) {
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    // -0.0 prints as "0".
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{:.*}", sign, decimals, rounded)
}

// A finite value whose lowest set bit is 2^-(decimals + 1) has exactly
// `decimals + 1` fraction digits, the last one a 5.
fn is_exact_tie(magnitude: f64, decimals: usize) -> bool {
    if magnitude == 0.0 || !magnitude.is_finite() {
        return false;
    }
    let bits = magnitude.to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased_exponent - 1075)
    };
    exponent + mantissa.trailing_zeros() as i64 == -(decimals as i64 + 1)
}

// Digit-grouped, rounding the shortest decimal form of the value half away from zero.
fn grouped_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    let shortest = value.abs().to_string();
    let (int_part, frac_part) = round_half_up(&shortest, decimals);
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 + decimals + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(&int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}

// Rounds a plain decimal digit string to `decimals` fraction digits.
fn round_half_up(digits: &str, decimals: usize) -> (String, String) {
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(decimals))
        .collect();
    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .map_or(false, |digit| *digit >= b'5');

    if round_up {
        let mut carry = true;
        for digit in kept.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - decimals;
    let to_string = |bytes: &[u8]| bytes.iter().map(|&b| b as char).collect::<String>();
    (to_string(&kept[..split]), to_string(&kept[split..]))
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rows sharing one value of the grouping column.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: String,
    pub rows: Vec<&'a Row>,
}

/// Groups rows by the string form of `key`, in order of first appearance.
///
/// Values are compared by their display form, so `1` and `"1"` land in the same
/// group. Rows without the column are grouped under [`MISSING_GROUP_KEY`].
pub fn group_by<'a>(rows: &'a [Row], key: &str) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let group_key = row
            .get(key)
            .map_or_else(|| MISSING_GROUP_KEY.to_string(), Scalar::to_string);
        match positions.get(&group_key) {
            Some(&pos) => groups[pos].rows.push(row),
            None => {
                positions.insert(group_key.clone(), groups.len());
                groups.push(Group {
                    key: group_key,
                    rows: vec![row],
                });
            }
        }
    }
    groups
}

/// Sum of the numeric value of `key`. Missing or non-numeric values count as 0.
pub fn sum(rows: &[Row], key: &str) -> f64 {
    rows.iter()
        .map(|row| row.get(key).map_or(0.0, Scalar::as_number))
        .map(|n| if n.is_nan() { 0.0 } else { n })
        .sum()
}

pub fn average(rows: &[Row], key: &str) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    sum(rows, key) / rows.len() as f64
}

/// Distinct values of `key` in order of first occurrence.
///
/// Equality is by type and value: `NaN` equals itself, `0` equals `-0`, and the
/// number `1` differs from the text `"1"`. Missing columns count as `Null`.
pub fn unique(rows: &[Row], key: &str) -> Vec<Scalar> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        let value = row.get(key).unwrap_or(&Scalar::Null);
        if seen.insert(Identity::of(value)) {
            out.push(value.clone());
        }
    }
    out
}

#[derive(PartialEq, Eq, Hash)]
enum Identity<'a> {
    Null,
    Bool(bool),
    Number(u64),
    Text(&'a str),
    Timestamp(i64, u32),
}

impl<'a> Identity<'a> {
    fn of(value: &'a Scalar) -> Self {
        match value {
            Scalar::Null => Identity::Null,
            Scalar::Bool(b) => Identity::Bool(*b),
            Scalar::Number(n) if n.is_nan() => Identity::Number(f64::NAN.to_bits()),
            Scalar::Number(n) if *n == 0.0 => Identity::Number(0f64.to_bits()),
            Scalar::Number(n) => Identity::Number(n.to_bits()),
            Scalar::Text(s) => Identity::Text(s),
            Scalar::Timestamp(ts) => {
                Identity::Timestamp(ts.timestamp(), ts.timestamp_subsec_nanos())
            }
        }
    }
}
