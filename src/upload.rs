//! Serialization of validated records into the registry's batch-update
//! format.
//!
//! Each record becomes one update keyed by the resource path
//! `Name::/places/{pid}/{slug}`, mapping field names to replace
//! directives. Empty fields are omitted so an upload never blanks a
//! value the record does not carry.

use crate::name::NameRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single field update: replace the stored values with `values`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldDirective {
    pub mode: String,
    pub values: Vec<String>,
}

impl FieldDirective {
    fn replace_one(value: &str) -> Self {
        Self {
            mode: "replace".to_string(),
            values: vec![value.to_string()],
        }
    }

    fn replace_many(values: &[String]) -> Self {
        Self {
            mode: "replace".to_string(),
            values: values.to_vec(),
        }
    }
}

/// One update entry: resource path to per-field directives.
pub type Update = BTreeMap<String, BTreeMap<String, FieldDirective>>;

/// The document the registry's batch loader consumes.
#[derive(Debug, Serialize)]
pub struct UpdateDocument {
    pub updates: Vec<Update>,
}

/// Resource path of a name under its parent place.
pub fn update_path(record: &NameRecord) -> String {
    format!("Name::/places/{}/{}", record.pid(), record.slug())
}

/// Build the update entry for one record. Only populated fields are
/// included.
pub fn update_for(record: &NameRecord) -> Update {
    let mut fields = BTreeMap::new();
    let mut put = |name: &str, value: &str| {
        if !value.is_empty() {
            fields.insert(name.to_string(), FieldDirective::replace_one(value));
        }
    };

    put("attested", record.attested());
    put("romanized", record.romanized());
    put("language", record.language());
    put("association_certainty", record.association_certainty());
    put("name_type", record.name_type());
    put("transcription_accuracy", record.transcription_accuracy());
    put(
        "transcription_completeness",
        record.transcription_completeness(),
    );
    put("details", record.details());
    put("summary", record.summary());

    if !record.time_periods().is_empty() {
        fields.insert(
            "time_periods".to_string(),
            FieldDirective::replace_many(record.time_periods()),
        );
    }

    BTreeMap::from([(update_path(record), fields)])
}

/// Build the full update document for a batch of records.
pub fn document_for(records: &[NameRecord]) -> UpdateDocument {
    UpdateDocument {
        updates: records.iter().map(update_for).collect(),
    }
}
