// src/pipeline/preprocess.rs

//! Submission preprocessing.
//!
//! Adds `speakers_names` and `slug` to each submission. The raw records are
//! left untouched; the enriched copies become the section's processed data.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::Record;
use crate::utils::{localized_str, slugify};

/// Speaker records keyed by speaker code.
pub fn speaker_map(speakers: &[Record]) -> HashMap<String, Record> {
    speakers
        .iter()
        .filter_map(|s| {
            let code = s.get("code")?.as_str()?;
            Some((code.to_string(), s.clone()))
        })
        .collect()
}

/// Space-separated speaker names of one submission.
///
/// Entries may be full speaker objects or bare speaker codes; names missing
/// from the submission are looked up in `speakers`.
pub fn speakers_names(submission: &Record, speakers: &HashMap<String, Record>) -> String {
    let Some(entries) = submission.get("speakers").and_then(Value::as_array) else {
        return String::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let code = match entry {
                Value::String(code) => Some(code.as_str()),
                other => other.get("code").and_then(Value::as_str),
            };
            entry
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| speakers.get(code?)?.get("name")?.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Slug built from track, code, title and speaker names.
pub fn submission_slug(submission: &Record, language: &str, speakers_names: &str) -> String {
    let field = |name: &str| {
        submission
            .get(name)
            .and_then(|v| localized_str(v, language))
            .unwrap_or_default()
    };
    slugify(
        &format!(
            "{}-{}-{}-{}",
            field("track"),
            field("code"),
            field("title"),
            speakers_names
        ),
        "-",
    )
}

/// Enriched copies of `submissions`.
pub fn preprocess(
    submissions: &[Record],
    speakers: &HashMap<String, Record>,
    language: &str,
) -> Vec<Record> {
    submissions
        .iter()
        .map(|submission| {
            let names = speakers_names(submission, speakers);
            let slug = submission_slug(submission, language, &names);

            let mut processed = submission.clone();
            if let Value::Object(map) = &mut processed {
                map.insert("speakers_names".to_string(), Value::String(names));
                map.insert("slug".to_string(), Value::String(slug));
            }
            processed
        })
        .collect()
}
