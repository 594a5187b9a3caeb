// src/utils/locale.rs

//! Language-tag resolution for multi-language API fields.
//!
//! Pretalx returns translatable fields as objects keyed by language code,
//! e.g. `{"en": "Talk", "de": "Vortrag"}`, sometimes nested in lists or
//! other objects.

use serde_json::{Map, Value};

/// Pick the `language` variant out of a (possibly nested) localized value.
///
/// - arrays resolve element by element
/// - an object holding `language` resolves to that entry, siblings untouched
/// - any other object resolves each of its values
/// - scalars are returned as they are
///
/// Resolution never fails: whatever cannot be resolved comes back unchanged,
/// so callers must expect partially resolved output.
pub fn resolve_localized(value: &Value, language: &str) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_localized(item, language))
                .collect(),
        ),
        Value::Object(map) => match map.get(language) {
            Some(found) => found.clone(),
            None => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), resolve_localized(v, language)))
                    .collect::<Map<_, _>>(),
            ),
        },
        scalar => scalar.clone(),
    }
}

/// Resolve a field and return it as a string if it resolves to one.
pub fn localized_str(value: &Value, language: &str) -> Option<String> {
    match resolve_localized(value, language) {
        Value::String(s) => Some(s),
        _ => None,
    }
}
