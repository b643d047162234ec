//! Response normalization
//!
//! The call layer returns listing results in more than one shape: a
//! positional array of columns, a keyed struct, or a struct carrying both
//! numeric keys and an explicit `__length__` marker. This module turns any of
//! them into a list of [`Prescription`] records.
//!
//! Nothing here fails. Malformed input degrades to empty defaults so that a
//! partially broken listing still renders; fetch failures are the caller's
//! concern.

use prescriptions_integrity::{Prescription, PrescriptionStatus};
use rx_reminder_shared::Address;
use serde_json::{Map, Value};

/// Key the call layer uses to mark the length of an array-like struct
pub const LENGTH_MARKER: &str = "__length__";

/// One column of a listing response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Ids,
    Medicines,
    Dosages,
    Frequencies,
    Durations,
    Statuses,
    ReminderTimes,
    Patients,
    IsActiveFlags,
}

impl Column {
    /// Name of the column in a keyed response
    pub fn name(&self) -> &'static str {
        match self {
            Column::Ids => "ids",
            Column::Medicines => "medicines",
            Column::Dosages => "dosages",
            Column::Frequencies => "frequencies",
            Column::Durations => "durations",
            Column::Statuses => "statuses",
            Column::ReminderTimes => "reminderTimes",
            Column::Patients => "patients",
            Column::IsActiveFlags => "isActiveFlags",
        }
    }

    /// Other names the same column has been returned under
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::ReminderTimes => &["allReminderTimes"],
            Column::Ids => &["prescriptionIds"],
            _ => &[],
        }
    }
}

/// Ordered columns of one listing method
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseLayout {
    pub columns: &'static [Column],
}

impl ResponseLayout {
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.position(column).is_some()
    }
}

/// Layout of the doctor's aggregate listing
pub const DOCTOR_LISTING: ResponseLayout = ResponseLayout {
    columns: &[
        Column::Ids,
        Column::Medicines,
        Column::Dosages,
        Column::Frequencies,
        Column::Durations,
        Column::Statuses,
        Column::ReminderTimes,
        Column::Patients,
        Column::IsActiveFlags,
    ],
};

/// Layout of a single patient's listing
pub const PATIENT_LISTING: ResponseLayout = ResponseLayout {
    columns: &[
        Column::Medicines,
        Column::Dosages,
        Column::Frequencies,
        Column::Durations,
        Column::Statuses,
        Column::ReminderTimes,
        Column::Ids,
    ],
};

/// Addresses known from the call itself rather than from the response
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingContext {
    pub patient: Option<Address>,
    pub doctor: Option<Address>,
}

/// Normalize one column value into an ordered sequence.
///
/// 1. an array is used as is;
/// 2. an object with a length marker is read positionally up to that length;
/// 3. any other object contributes its values, minus plain numbers.
///
/// Anything else is an empty sequence.
pub fn normalize_sequence(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match length_marker(map) {
            Some(length) => (0..length)
                .map(|i| map.get(&i.to_string()).cloned().unwrap_or(Value::Null))
                .collect(),
            None => ordered_values(map)
                .into_iter()
                .filter(|(key, value)| *key != LENGTH_MARKER && !value.is_number())
                .map(|(_, value)| value.clone())
                .collect(),
        },
        _ => Vec::new(),
    }
}

// A zero or unreadable marker counts as absent. The length never exceeds
// the number of keys, so a bogus marker cannot drive the allocation.
fn length_marker(map: &Map<String, Value>) -> Option<usize> {
    map.get(LENGTH_MARKER)
        .and_then(as_u64)
        .filter(|length| *length > 0)
        .map(|length| usize::try_from(length).unwrap_or(usize::MAX).min(map.len()))
}

// Integer-like keys first in numeric order, the rest in map order.
fn ordered_values(map: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut entries: Vec<(Option<u64>, usize, &str, &Value)> = map
        .iter()
        .enumerate()
        .map(|(i, (key, value))| (key.parse::<u64>().ok(), i, key.as_str(), value))
        .collect();
    entries.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });
    entries.into_iter().map(|(_, _, key, value)| (key, value)).collect()
}

/// Locate a column by name (or alias), falling back to its position
fn locate_column<'a>(raw: &'a Value, column: Column, index: usize) -> Option<&'a Value> {
    match raw {
        Value::Object(map) => std::iter::once(column.name())
            .chain(column.aliases().iter().copied())
            .find_map(|name| map.get(name))
            .or_else(|| map.get(&index.to_string())),
        Value::Array(items) => items.get(index),
        _ => None,
    }
}

/// Extract every column of `layout` as a normalized sequence
pub fn extract_columns(raw: &Value, layout: &ResponseLayout) -> Vec<Vec<Value>> {
    layout
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            locate_column(raw, *column, index)
                .map(normalize_sequence)
                .unwrap_or_default()
        })
        .collect()
}

/// Map a raw listing response to prescriptions.
///
/// Rows without a medicine are placeholders and are dropped.
pub fn map_prescriptions(
    raw: &Value,
    layout: &ResponseLayout,
    context: &MappingContext,
) -> Vec<Prescription> {
    let columns = extract_columns(raw, layout);
    let count = columns.iter().map(Vec::len).max().unwrap_or(0);

    let cell = |column: Column, row: usize| cell_at(&columns, layout, column, row);

    let mut prescriptions = Vec::with_capacity(count);
    for row in 0..count {
        let medicine = cell(Column::Medicines, row).map(as_text).unwrap_or_default();
        if medicine.is_empty() {
            continue;
        }

        let id = cell(Column::Ids, row)
            .and_then(as_u64)
            .unwrap_or(row as u64);

        let reminder_times = match cell(Column::ReminderTimes, row) {
            Some(Value::Array(times)) => times
                .iter()
                .map(as_text)
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        let patient_address = cell(Column::Patients, row)
            .and_then(|v| Address::parse(&as_text(v)).ok())
            .or_else(|| context.patient.clone());

        let is_active = if layout.contains(Column::IsActiveFlags) {
            cell(Column::IsActiveFlags, row).map(truthy).unwrap_or(false)
        } else {
            true
        };

        prescriptions.push(Prescription {
            id,
            medicine,
            dosage: cell(Column::Dosages, row).map(as_text).unwrap_or_default(),
            frequency: cell(Column::Frequencies, row).map(as_text).unwrap_or_default(),
            duration_days: cell(Column::Durations, row).and_then(as_u64).unwrap_or(0),
            status: cell(Column::Statuses, row)
                .map(PrescriptionStatus::from_json)
                .unwrap_or_default(),
            reminder_times,
            patient_address,
            doctor_address: context.doctor.clone(),
            is_active,
        });
    }

    prescriptions
}

fn cell_at<'a>(
    columns: &'a [Vec<Value>],
    layout: &ResponseLayout,
    column: Column,
    row: usize,
) -> Option<&'a Value> {
    layout
        .position(column)
        .and_then(|position| columns.get(position))
        .and_then(|values| values.get(row))
}

/// Trimmed text of a scalar; empty for null and containers
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Non-negative integer from a number or numeric string
pub fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Loose boolean reading of a call result
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}
