//! Metadata derivation: a pure function from a parsed message (plus
//! caller-supplied extras and year bounds) to a flat, ordered mapping
//! ready for the catalog sink.

use chrono::Datelike;
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::address::AddressElements;
use crate::model::message::Message;
use crate::parser::header::parse_date;

/// Inclusive year sanity bounds applied to parsed `Date` headers.
pub const DEFAULT_YEAR_BOUNDS: (i32, i32) = (1970, 2020);

/// Replacement for embedded newlines in `searchstring`.
const LINE_BREAK_MARK: &str = "<br>";
/// Replacement for tabs in `searchstring`.
const TAB_AS_SPACES: &str = "    ";

/// Derive the catalog metadata for one message.
///
/// Contains every header under its original name (with `Path` and
/// `Newsgroups` turned into arrays in place), a display-oriented
/// `searchstring`, `sender_*` fields when a `From` header parses, a
/// normalized `date` when the `Date` header parses within `year_bounds`
/// (empty string when the year is out of range, absent when unparseable),
/// and `filename` (the message identifier unless an extra overrides it).
///
/// Later `extras` entries override same-named header values. The output is
/// a pure function of the inputs; recomputing yields identical metadata.
pub fn normalize(
    message: &Message,
    extras: &[(String, String)],
    year_bounds: (i32, i32),
) -> Map<String, Value> {
    let mut meta = Map::new();

    for (name, value) in message.headers().iter() {
        let entry = if name.eq_ignore_ascii_case("Path") {
            split_list(value, '!')
        } else if name.eq_ignore_ascii_case("Newsgroups") {
            split_list(value, ',')
        } else {
            Value::String(value.to_string())
        };
        meta.insert(name.to_string(), entry);
    }

    meta.insert(
        "searchstring".to_string(),
        Value::String(
            message
                .raw()
                .replace('\n', LINE_BREAK_MARK)
                .replace('\t', TAB_AS_SPACES),
        ),
    );

    if let Some(from) = message.headers().get("From") {
        let elements = AddressElements::parse(from);
        for (key, value) in elements.fields() {
            meta.insert(format!("sender_{key}"), Value::String(value.to_string()));
        }
    }

    if let Some(raw_date) = message.headers().get("Date") {
        match parse_date(raw_date) {
            Some(parsed) => {
                let year = parsed.year();
                let value = if year < year_bounds.0 || year > year_bounds.1 {
                    debug!(year, "Date outside sanity bounds, blanking");
                    String::new()
                } else {
                    parsed.to_rfc3339()
                };
                meta.insert("date".to_string(), Value::String(value));
            }
            None => {
                // Unparseable date: the key is simply absent.
            }
        }
    }

    for (key, value) in extras {
        meta.insert(key.clone(), Value::String(value.clone()));
    }

    if !meta.contains_key("filename") {
        meta.insert(
            "filename".to_string(),
            Value::String(message.id().to_string()),
        );
    }

    meta
}

/// Split a header value into a JSON array of its parts.
fn split_list(value: &str, sep: char) -> Value {
    Value::Array(
        value
            .split(sep)
            .map(|p| Value::String(p.to_string()))
            .collect(),
    )
}
