// src/pipeline/derive.rs

//! Derived views over cached records.
//!
//! - distinct track names, submission states and submission types
//! - state filters (`accepted`, `confirmed`, ...)
//! - the language-resolved question export written to `questions.yml`

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::models::{Record, StatesConfig};
use crate::utils::{localized_str, resolve_localized};

pub const TRACK_NAMES_FILE: &str = "track_names.txt";
pub const SUBMISSION_STATES_FILE: &str = "submission_states.txt";
pub const SUBMISSION_TYPES_FILE: &str = "submission_types.txt";
pub const QUESTIONS_FILE: &str = "questions.yml";

/// Read-only view over submission records.
pub struct Submissions<'a> {
    records: &'a [Record],
    language: &'a str,
    states: &'a StatesConfig,
}

impl<'a> Submissions<'a> {
    pub fn new(records: &'a [Record], language: &'a str, states: &'a StatesConfig) -> Self {
        Self {
            records,
            language,
            states,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tracks present in submissions (not necessarily every track of the event).
    pub fn track_names(&self) -> Vec<String> {
        self.distinct(|r| r.get("track").and_then(|v| localized_str(v, self.language)))
    }

    /// States present in submissions.
    pub fn submission_states(&self) -> Vec<String> {
        self.distinct(|r| r.get("state").and_then(Value::as_str).map(String::from))
    }

    /// Submission types present in submissions.
    pub fn submission_types(&self) -> Vec<String> {
        self.distinct(|r| {
            r.get("submission_type")
                .and_then(|v| localized_str(v, self.language))
        })
    }

    pub fn accepted(&self) -> Vec<&'a Record> {
        self.filter_state(&self.states.accepted.values())
    }

    pub fn confirmed(&self) -> Vec<&'a Record> {
        self.filter_state(&self.states.confirmed.values())
    }

    pub fn accepted_or_confirmed(&self) -> Vec<&'a Record> {
        self.filter_state(&self.states.confirmed_accepted.values())
    }

    /// Submissions whose `state` is one of `states`.
    pub fn filter_state(&self, states: &[&str]) -> Vec<&'a Record> {
        self.records
            .iter()
            .filter(|r| {
                r.get("state")
                    .and_then(Value::as_str)
                    .is_some_and(|s| states.contains(&s))
            })
            .collect()
    }

    /// Sorted, de-duplicated values of one field; records lacking it are skipped.
    fn distinct(&self, field: impl Fn(&Record) -> Option<String>) -> Vec<String> {
        self.records
            .iter()
            .filter_map(field)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Render one value per line.
pub fn render_lines(values: &[String]) -> String {
    values.join("\n")
}

/// Selected, language-resolved fields of each question, keyed by question text.
///
/// Fields missing from a question are left out. Questions whose text does not
/// resolve to a string are skipped.
pub fn questions_export(
    questions: &[Record],
    select_nodes: &[String],
    language: &str,
) -> BTreeMap<String, Map<String, Value>> {
    let mut export = BTreeMap::new();

    for question in questions {
        let Some(key) = question
            .get("question")
            .and_then(|q| localized_str(q, language))
        else {
            log::warn!(
                "Skipping question without text: id={}",
                question.get("id").unwrap_or(&Value::Null)
            );
            continue;
        };

        let selected: Map<String, Value> = select_nodes
            .iter()
            .filter_map(|node| {
                question
                    .get(node)
                    .map(|value| (node.clone(), resolve_localized(value, language)))
            })
            .collect();

        export.insert(key, selected);
    }

    export
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submissions() -> Vec<Record> {
        vec![
            json!({"code": "A", "state": "confirmed",
                   "track": {"en": "Web", "de": "Netz"},
                   "submission_type": {"en": "Talk"}}),
            json!({"code": "B", "state": "accepted",
                   "track": {"en": "Data"},
                   "submission_type": {"en": "Tutorial"}}),
            json!({"code": "C", "state": "submitted",
                   "track": {"en": "Web"},
                   "submission_type": {"en": "Talk"}}),
            json!({"code": "D", "state": "confirmed",
                   "track": null,
                   "submission_type": "Poster"}),
            json!({"code": "E", "state": "accepted",
                   "track": {"en": "Core"},
                   "submission_type": {"en": "Talk"}}),
        ]
    }

    #[test]
    fn test_track_names_sorted_distinct() {
        let records = submissions();
        let states = StatesConfig::default();
        let view = Submissions::new(&records, "en", &states);
        assert_eq!(view.track_names(), vec!["Core", "Data", "Web"]);
    }

    #[test]
    fn test_track_names_other_language() {
        let records = submissions();
        let states = StatesConfig::default();
        let view = Submissions::new(&records, "de", &states);
        // Only "Web" has a German name; the others stay unresolved maps and are skipped.
        assert_eq!(view.track_names(), vec!["Netz"]);
    }

    #[test]
    fn test_states_and_types_sorted_distinct() {
        let records = submissions();
        let states = StatesConfig::default();
        let view = Submissions::new(&records, "en", &states);
        assert_eq!(
            view.submission_states(),
            vec!["accepted", "confirmed", "submitted"]
        );
        assert_eq!(view.submission_types(), vec!["Poster", "Talk", "Tutorial"]);
    }

    #[test]
    fn test_state_filters_are_distinct() {
        let records = submissions();
        let states = StatesConfig::default();
        let view = Submissions::new(&records, "en", &states);

        let codes = |rs: Vec<&Record>| -> Vec<String> {
            rs.iter()
                .map(|r| r["code"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(codes(view.accepted()), vec!["B", "E"]);
        assert_eq!(codes(view.confirmed()), vec!["A", "D"]);
        assert_eq!(
            codes(view.accepted_or_confirmed()),
            vec!["A", "B", "D", "E"]
        );
        assert_eq!(codes(view.filter_state(&["submitted"])), vec!["C"]);
        assert!(view.filter_state(&[]).is_empty());
    }

    #[test]
    fn test_render_lines() {
        let values = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_lines(&values), "a\nb");
        assert_eq!(render_lines(&[]), "");
    }

    #[test]
    fn test_questions_export() {
        let questions = vec![
            json!({
                "id": 1,
                "question": {"en": "T-shirt size?", "de": "T-Shirt-Größe?"},
                "variant": "choices",
                "help_text": {"en": "Pick one"},
                "options": [{"id": 10, "answer": {"en": "S"}}, {"id": 11, "answer": {"en": "M"}}],
                "contains_personal_data": false
            }),
            json!({"id": 2, "question": {"fr": "Oui?"}, "variant": "boolean"}),
            json!({"id": 3, "question": "Dietary needs?", "variant": "text"}),
        ];
        let nodes: Vec<String> = ["question", "variant", "help_text", "options"]
            .into_iter()
            .map(String::from)
            .collect();

        let export = questions_export(&questions, &nodes, "en");
        assert_eq!(export.len(), 2);

        let shirt = &export["T-shirt size?"];
        assert_eq!(shirt["question"], json!("T-shirt size?"));
        assert_eq!(shirt["variant"], json!("choices"));
        assert_eq!(shirt["help_text"], json!("Pick one"));
        assert_eq!(
            shirt["options"],
            json!([{"id": 10, "answer": "S"}, {"id": 11, "answer": "M"}])
        );
        assert!(!shirt.contains_key("contains_personal_data"));

        let diet = &export["Dietary needs?"];
        assert!(!diet.contains_key("help_text"));
        assert_eq!(diet["variant"], json!("text"));
    }

    #[test]
    fn test_questions_export_renders_as_yaml() {
        let questions = vec![json!({"question": {"en": "Age?"}, "variant": "number"})];
        let nodes = vec!["question".to_string(), "variant".to_string()];
        let yaml = serde_yaml::to_string(&questions_export(&questions, &nodes, "en")).unwrap();
        assert!(yaml.contains("Age?"));
        assert!(yaml.contains("variant: number"));
    }
}
