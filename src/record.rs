use serde_json::{Map, Value};

use crate::config::Fields;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverImage {
    pub url: Option<String>,
    pub tmp_url: Option<String>,
}

impl CoverImage {
    /// Temporary URL first, permanent URL otherwise. Empty strings count as missing.
    pub fn best_url(&self) -> Option<&str> {
        fn non_empty(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|s| !s.is_empty())
        }
        non_empty(&self.tmp_url).or_else(|| non_empty(&self.url))
    }
}

/// One table row, as the site sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub id: String,
    pub category: String,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Epoch milliseconds
    pub published: i64,
    pub covers: Vec<CoverImage>,
}

impl Record {
    /// Builds a record from the raw upstream JSON. Returns `None` when the item has
    /// no `fields` object or no identifier.
    pub fn from_value(value: &Value, fields: &Fields) -> Option<Record> {
        let item = value.as_object()?;
        let values = item.get("fields")?.as_object()?;

        let id = ["id", "record_id"].iter()
            .filter_map(|key| item.get(*key))
            .find_map(value_to_text)?;

        Some(Record {
            id,
            category: text_field(values, &fields.category).unwrap_or_default(),
            title: text_field(values, &fields.title),
            body: text_field(values, &fields.body),
            published: values.get(&fields.published).and_then(value_to_millis).unwrap_or(0),
            covers: values.get(&fields.cover).map(extract_covers).unwrap_or_default(),
        })
    }
}

fn text_field(values: &Map<String, Value>, name: &str) -> Option<String> {
    values.get(name).and_then(value_to_text)
}

// Text cells come either as plain strings or as rich text segments
// like [{"type": "text", "text": "..."}]. Empty text counts as missing.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(segments) => {
            let text: String = segments.iter()
                .filter_map(|seg| match seg {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            if text.is_empty() { None } else { Some(text) }
        }
        Value::Object(obj) => obj.get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn value_to_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn extract_covers(value: &Value) -> Vec<CoverImage> {
    let Some(items) = value.as_array() else {
        return vec![];
    };

    items.iter()
        .filter_map(Value::as_object)
        .map(|obj| CoverImage {
            url: obj.get("url").and_then(Value::as_str).map(str::to_string),
            tmp_url: obj.get("tmp_url").and_then(Value::as_str).map(str::to_string),
        })
        .collect()
}
