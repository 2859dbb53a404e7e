// src/convert/metadata.rs

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Index of what a conversion run saw, written beside the NDJSON files.
#[derive(Debug, Serialize)]
pub struct Metadata {
    #[serde(rename = "DATA")]
    pub data: MetadataData,
}

#[derive(Debug, Serialize)]
pub struct MetadataData {
    /// Subject code → null; a set kept in object form.
    #[serde(rename = "SUBJECTS")]
    pub subjects: BTreeMap<String, ()>,
    #[serde(rename = "SEMESTERS")]
    pub semesters: Vec<String>,
}

impl Metadata {
    /// `semesters` is the configured list as given, not just the tabs found.
    pub fn new(subjects: &BTreeSet<String>, semesters: &[String]) -> Self {
        Self {
            data: MetadataData {
                subjects: subjects.iter().map(|s| (s.clone(), ())).collect(),
                semesters: semesters.to_vec(),
            },
        }
    }

    /// Pretty JSON with 4-space indentation.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}
