use serde_json::{Map, Value};

/// Marker for the per-resource detail sequence inside a reservation record.
const DETAIL_SEQUENCE_MARKER: &str = "RecommendationDetails";

/// Marker for the single-key instance descriptor inside a detail item.
const INSTANCE_DETAILS_MARKER: &str = "InstanceDetails";

/// One spreadsheet cell, typed so the workbook can apply numeric formats.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// One flat output row: parallel header/value sequences of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    pub headers: Vec<String>,
    pub values: Vec<CellValue>,
}

impl FlatRow {
    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.headers.push(header.into());
        self.values.push(value);
    }

    pub fn extend(&mut self, other: FlatRow) {
        self.headers.extend(other.headers);
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Inserts spaces into an identifier-style name: before an uppercase letter
/// that starts a new word after a lowercase/digit, and before an uppercase
/// letter followed by lowercase (acronym-to-word boundary).
///
/// "EstimatedMonthlySavingsAmount" -> "Estimated Monthly Savings Amount",
/// "EC2InstanceDetails" -> "EC2 Instance Details", "ID" -> "ID".
pub fn camel_to_space(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars
                .get(i + 1)
                .is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || next_is_lower {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// Classifies a scalar for spreadsheet emission. String rules: all decimal
/// digits -> integer; contains a decimal point and parses -> float; anything
/// else stays text. Note "-5" stays text: the digits check rejects the sign
/// and the float path requires a decimal point.
pub fn coerce(value: &Value) -> CellValue {
    match value {
        Value::String(s) => coerce_str(s),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => CellValue::Float(n.as_f64().unwrap_or(0.0)),
        },
        Value::Bool(b) => CellValue::Text(b.to_string()),
        Value::Null => CellValue::Text(String::new()),
        // Nested values never reach here via the flattener; render as JSON.
        other => CellValue::Text(other.to_string()),
    }
}

fn coerce_str(s: &str) -> CellValue {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = s.parse::<i64>() {
            return CellValue::Int(n);
        }
    }
    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    CellValue::Text(s.to_string())
}

/// Extracts the top-level scalar fields of a record, in the map's (sorted,
/// deterministic) iteration order. Nested mappings and sequences are skipped
/// at this level; sequences only surface via detail expansion.
pub fn flatten_scalars(record: &Map<String, Value>) -> FlatRow {
    let mut row = FlatRow::default();
    for (key, value) in record {
        if value.is_object() || value.is_array() {
            continue;
        }
        row.push(camel_to_space(key), coerce(value));
    }
    row
}

/// Extracts one detail item. The instance-descriptor field is a single-key
/// mapping (keyed by resource family, which downstream consumers ignore);
/// its sole value holds the resource type and region, emitted under the
/// literal labels "InstanceType" and "Region".
pub fn flatten_detail_item(item: &Map<String, Value>) -> FlatRow {
    let mut row = FlatRow::default();
    for (key, value) in item {
        if key.contains(INSTANCE_DETAILS_MARKER) {
            let inner = value
                .as_object()
                .and_then(|m| m.values().next())
                .and_then(Value::as_object);
            if let Some(inner) = inner {
                let pull = |field: &str| {
                    inner
                        .get(field)
                        .map(coerce)
                        .unwrap_or_else(|| CellValue::Text(String::new()))
                };
                row.push("InstanceType", pull("InstanceType"));
                row.push("Region", pull("Region"));
            }
        } else if !value.is_object() && !value.is_array() {
            row.push(camel_to_space(key), coerce(value));
        }
    }
    row
}

/// Transforms one raw recommendation record into flat rows.
///
/// An empty record yields zero rows. A record without a detail sequence
/// yields exactly one row of its scalar fields. A record with a detail
/// sequence yields one row per item: the scalar prefix followed by the
/// item's fields. A present-but-empty detail sequence yields zero rows.
pub fn flatten_record(record: &Map<String, Value>) -> Vec<FlatRow> {
    if record.is_empty() {
        return Vec::new();
    }

    let details = record.iter().find_map(|(key, value)| match value {
        Value::Array(items) if key.contains(DETAIL_SEQUENCE_MARKER) => Some(items),
        _ => None,
    });

    let prefix = flatten_scalars(record);
    match details {
        None => vec![prefix],
        Some(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| {
                let mut row = prefix.clone();
                row.extend(flatten_detail_item(item));
                row
            })
            .collect(),
    }
}
