use crate::domain::week::serde_label;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A sale date as it arrives from point-of-sale exports.
///
/// JSON numbers are spreadsheet serial day counts, ISO `YYYY-MM-DD` strings are
/// calendar dates, and any other string is kept as text for
/// [`crate::time::weekday::weekday_of`] to interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Serial(f64),
    Date(NaiveDate),
    Text(String),
}

impl From<NaiveDate> for DateValue {
    fn from(d: NaiveDate) -> Self {
        DateValue::Date(d)
    }
}

impl From<f64> for DateValue {
    fn from(n: f64) -> Self {
        DateValue::Serial(n)
    }
}

impl From<&str> for DateValue {
    fn from(s: &str) -> Self {
        DateValue::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedQuantity {
    pub date: DateValue,
    pub quantity: f64,
}

impl DatedQuantity {
    pub fn new(date: impl Into<DateValue>, quantity: f64) -> Self {
        Self {
            date: date.into(),
            quantity,
        }
    }

    /// Negative or non-finite quantities count as zero.
    pub fn effective_quantity(&self) -> f64 {
        sanitize_quantity(self.quantity)
    }
}

pub(crate) fn sanitize_quantity(q: f64) -> f64 {
    if q.is_finite() && q > 0.0 {
        q
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHistory {
    pub product_id: String,
    #[serde(default)]
    pub daily_sales: Vec<DatedQuantity>,
}

impl ProductHistory {
    pub fn new(product_id: impl Into<String>, daily_sales: Vec<DatedQuantity>) -> Self {
        Self {
            product_id: product_id.into(),
            daily_sales,
        }
    }

    /// Sum over every record, including those whose date cannot be resolved.
    pub fn total_sales(&self) -> f64 {
        self.daily_sales
            .iter()
            .map(DatedQuantity::effective_quantity)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    #[serde(with = "serde_label")]
    pub weekday: Weekday,
    pub count: f64,
}

impl TrafficRecord {
    pub fn new(weekday: Weekday, count: f64) -> Self {
        Self { weekday, count }
    }
}
