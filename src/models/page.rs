//! Page envelope returned by paginated API endpoints.

use serde_json::Value;

/// An opaque API record (submission, speaker, question, ...).
pub type Record = Value;

/// One page of results plus the pointer to the next page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub results: Vec<Record>,
    pub next: Option<String>,
}

impl Page {
    /// Build a page from a decoded response body.
    ///
    /// Both `results` (an array) and `next` (a string or null) must be present.
    /// An empty `next` string is treated like null.
    pub fn from_envelope(body: Value) -> Result<Self, String> {
        let Value::Object(mut envelope) = body else {
            return Err("response body is not a JSON object".to_string());
        };

        let results = match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(format!("'results' is not an array (got {})", kind(&other)));
            }
            None => return Err("missing 'results' key".to_string()),
        };

        let next = match envelope.remove("next") {
            Some(Value::String(url)) if url.trim().is_empty() => None,
            Some(Value::String(url)) => Some(url),
            Some(Value::Null) => None,
            Some(other) => {
                return Err(format!("'next' is not a URL (got {})", kind(&other)));
            }
            None => return Err("missing 'next' key".to_string()),
        };

        Ok(Self { results, next })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
