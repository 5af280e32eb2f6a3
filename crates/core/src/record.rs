use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AuditError;

/// 1-based spreadsheet row number, stable for one validation run.
pub type RowNumber = u32;

/// A single cell value after header-to-field mapping.
///
/// Spreadsheet readers hand back strings, numbers (including Excel serial
/// dates) and already-typed dates; anything else arrives as `Missing`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireValue", into = "WireValue")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    #[default]
    Missing,
}

static MISSING: FieldValue = FieldValue::Missing;

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// True for missing values and whitespace-only text. `0` and `"0"` are not blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Date(_) => false,
        }
    }

    /// Extract as string, returning None for non-text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the value the way it reads in the sheet. `None` for missing values.
    pub fn to_display(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::Date(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            FieldValue::Missing => None,
        }
    }
}

/// Integral numbers print without a trailing `.0`, matching spreadsheet display.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::Date(dt)
    }
}

// ── Wire format ───────────────────────────────────────────────

/// JSON shape of a cell: `null`, a number, a string, a bool, or `{"$date": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Null,
    Number(f64),
    Bool(bool),
    Text(String),
    Date {
        #[serde(rename = "$date")]
        date: NaiveDateTime,
    },
}

impl From<WireValue> for FieldValue {
    fn from(w: WireValue) -> Self {
        match w {
            WireValue::Null => FieldValue::Missing,
            WireValue::Number(n) => FieldValue::Number(n),
            WireValue::Bool(b) => FieldValue::Text(b.to_string()),
            WireValue::Text(s) => FieldValue::Text(s),
            WireValue::Date { date } => FieldValue::Date(date),
        }
    }
}

impl From<FieldValue> for WireValue {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Missing => WireValue::Null,
            FieldValue::Number(n) => WireValue::Number(n),
            FieldValue::Text(s) => WireValue::Text(s),
            FieldValue::Date(date) => WireValue::Date { date },
        }
    }
}

// ── Row record ────────────────────────────────────────────────

/// One decoded spreadsheet row: canonical field name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord {
    fields: HashMap<String, FieldValue>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling rows by hand.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Look up a field. Absent keys read as [`FieldValue::Missing`].
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&MISSING)
    }

    /// First non-blank value along a fallback chain of field names.
    pub fn first_present<S: AsRef<str>>(&self, fields: &[S]) -> Option<&FieldValue> {
        fields
            .iter()
            .map(|f| self.get(f.as_ref()))
            .find(|v| !v.is_blank())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A row as handed over by the field-mapping stage: its number plus its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowInput {
    pub row: RowNumber,
    pub fields: RowRecord,
}

/// Parse a JSON array of `{"row": n, "fields": {...}}` objects.
///
/// Row numbers must be 1-based.
pub fn parse_rows_json(json: &str) -> Result<Vec<RowInput>, AuditError> {
    let rows: Vec<RowInput> = serde_json::from_str(json)?;
    if let Some(bad) = rows.iter().find(|r| r.row == 0) {
        return Err(AuditError::InvalidRowNumber(bad.row));
    }
    Ok(rows)
}
