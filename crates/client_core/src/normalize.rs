//! Maps raw backend objects into the shapes the stores keep.

use serde::Serialize;
use serde_json::Value;
use unsub_shared::{
    domain::{CounterVersion, Issnl},
    protocol::{DataFilePayload, JournalPayload, JsonMap, WarningPayload},
};

use crate::catalog::{data_file_info, warning_info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherJournal {
    pub issnl: Issnl,
    pub title: String,
    pub issns: Vec<String>,
    pub issns_display: String,
    pub subject: Option<String>,
    pub price: Option<f64>,
    pub error: Option<String>,
    pub is_valid: bool,
    pub extra: JsonMap,
}

pub fn make_publisher_journal(raw: JournalPayload) -> PublisherJournal {
    let issns_display = raw.issns.join(", ");
    let is_valid = raw.error.is_none();
    PublisherJournal {
        issnl: raw.issnl,
        title: raw.title,
        issns: raw.issns,
        issns_display,
        subject: raw.subject,
        price: raw.price,
        error: raw.error,
        is_valid,
        extra: raw.extra,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFile {
    pub id: String,
    pub name: String,
    pub uploaded: bool,
    pub is_live: bool,
    pub rows_count: Option<u64>,
    pub display_name: Option<&'static str>,
    pub server_key: Option<&'static str>,
    pub counter_version: Option<CounterVersion>,
    pub msg: Option<&'static str>,
    pub extra: JsonMap,
}

pub fn make_data_file(raw: DataFilePayload) -> DataFile {
    let name = raw.name.replacen("prices", "price", 1);
    let id = camel_case(&name);
    let info = data_file_info(&id);
    DataFile {
        display_name: info.map(|i| i.display_name),
        server_key: info.map(|i| i.server_key),
        counter_version: info.and_then(|i| i.counter_version),
        msg: info.map(|i| i.msg),
        id,
        name,
        uploaded: raw.uploaded,
        is_live: raw.is_live,
        rows_count: raw.rows_count,
        extra: raw.extra,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub id: String,
    pub is_dismissed: bool,
    pub display_name: Option<&'static str>,
    pub link: Option<&'static str>,
    pub msg: Option<&'static str>,
    pub extra: JsonMap,
}

pub fn make_warning(raw: WarningPayload) -> Warning {
    let id = camel_case(&raw.id);
    let info = warning_info(&id);
    Warning {
        display_name: info.map(|i| i.display_name),
        link: info.map(|i| i.link),
        msg: info.map(|i| i.msg),
        id,
        is_dismissed: raw.is_dismissed,
        extra: raw.extra,
    }
}

/// `missing_prices`, `counter-trj2` and `PerpetualAccess` become
/// `missingPrices`, `counterTrj2` and `perpetualAccess`.
pub fn camel_case(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::with_capacity(input.len());
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Comma join of the map's values, rendered the way a browser stringifies
/// them. Used as a cheap change marker, not a hash.
pub fn values_digest(values: &JsonMap) -> String {
    values.values().map(js_string).collect::<Vec<_>>().join(",")
}

fn js_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(js_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
