// src/convert/record.rs

use serde_json::{Map, Value};

use super::extract::TabTable;
use crate::sheet::COURSE;

/// One converted row: the tab's own columns untouched, plus the source tab and
/// the subject parsed from `Course`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Map<String, Value>,
    pub tab: String,
    pub subject: Option<String>,
}

impl Record {
    pub fn new(headers: &[String], values: Vec<Value>, tab: &str) -> Self {
        let fields: Map<String, Value> = headers.iter().cloned().zip(values).collect();
        let mut record = Self {
            fields,
            tab: tab.to_string(),
            subject: None,
        };
        record.subject = record.course().as_deref().and_then(subject_of);
        record
    }

    /// The `Course` column as text, when present and non-empty.
    pub fn course(&self) -> Option<String> {
        match self.fields.get(COURSE)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Flat JSON object: columns in order, then `tab`, then `subject` if any.
    pub fn into_json(self) -> Value {
        let mut obj = self.fields;
        obj.insert("tab".to_string(), Value::String(self.tab));
        if let Some(subject) = self.subject {
            obj.insert("subject".to_string(), Value::String(subject));
        }
        Value::Object(obj)
    }
}

/// Subject code of a "SUBJECT NUMBER" course string; anything but exactly two
/// single-space-separated tokens has none.
pub fn subject_of(course: &str) -> Option<String> {
    let parts: Vec<&str> = course.trim().split(' ').collect();
    match parts.as_slice() {
        [subject, _] => Some(subject.to_string()),
        _ => None,
    }
}

/// All records of a table, in row order.
pub fn records(table: &TabTable, tab: &str) -> Vec<Record> {
    table
        .rows
        .iter()
        .map(|values| Record::new(&table.headers, values.clone(), tab))
        .collect()
}

/// One compact JSON object per line, each line terminated by `\n`.
pub fn to_ndjson(records: Vec<Record>) -> serde_json::Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(&record.into_json())?);
        out.push('\n');
    }
    Ok(out)
}
