//! Time-series points and their InfluxDB v2 line protocol encoding.
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! Tags are kept in a `BTreeMap` so the encoded form is canonical (sorted by
//! key). Fields keep insertion order; setting a field twice replaces it.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FatigueError, Result};

/// A value that can be stored in a point field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Integer(v) => write!(f, "{v}i"),
            FieldValue::String(v) => {
                write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
            }
            FieldValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// A single timestamped record: measurement, tags, fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FieldValue)>,
    timestamp_ns: Option<i64>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: Vec::new(),
            timestamp_ns: None,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    pub fn timestamp_ns(mut self, ts: i64) -> Self {
        self.timestamp_ns = Some(ts);
        self
    }

    /// Stamp the point with the current wall clock.
    pub fn stamped_now(self) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or_default();
        self.timestamp_ns(ts)
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn time(&self) -> Option<i64> {
        self.timestamp_ns
    }

    /// Encode as one line of line protocol.
    ///
    /// Fails when the point carries no fields (the backend rejects such lines).
    pub fn to_line_protocol(&self) -> Result<String> {
        if self.fields.is_empty() {
            return Err(FatigueError::StorageWrite(format!(
                "point '{}' has no fields",
                self.measurement
            )));
        }

        let mut line = escape_measurement(&self.measurement);
        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_string());
        }

        if let Some(ts) = self.timestamp_ns {
            line.push(' ');
            line.push_str(&ts.to_string());
        }
        Ok(line)
    }
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

/// Tag keys, tag values and field keys share the same escaping rules.
fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

/// Backslash and line breaks are escaped everywhere; `special` adds the
/// separators of the current position.
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn field_values_encode_by_type() {
        assert_eq!(FieldValue::Integer(42).to_string(), "42i");
        assert_eq!(FieldValue::Float(3.5).to_string(), "3.5");
        assert_eq!(FieldValue::Boolean(false).to_string(), "false");
        assert_eq!(
            FieldValue::String("say \"hi\" \\o/".into()).to_string(),
            "\"say \\\"hi\\\" \\\\o/\""
        );
    }

    #[test]
    fn tags_are_sorted_and_timestamp_appended() {
        let p = Point::new("fatigue")
            .field("value", FieldValue::Integer(7))
            .tag("source", "anon")
            .tag("host", "web-1")
            .timestamp_ns(1_000_000_000);
        assert_eq!(
            p.to_line_protocol().unwrap(),
            "fatigue,host=web-1,source=anon value=7i 1000000000"
        );
    }

    #[test]
    fn no_timestamp_leaves_it_to_the_server() {
        let p = Point::new("m").field("f", FieldValue::Integer(1));
        assert_eq!(p.to_line_protocol().unwrap(), "m f=1i");
    }

    #[test]
    fn escapes_special_characters() {
        let p = Point::new("my measurement")
            .tag("tag key", "a,b=c")
            .field("field=key", FieldValue::String("x".into()))
            .timestamp_ns(3);
        assert_eq!(
            p.to_line_protocol().unwrap(),
            "my\\ measurement,tag\\ key=a\\,b\\=c field\\=key=\"x\" 3"
        );
    }

    #[test]
    fn line_breaks_in_tag_values_stay_on_one_line() {
        let p = Point::new("fatigue")
            .tag("source", "a\nfatigue,host=spoofed\r\tx")
            .field("value", FieldValue::Integer(5))
            .timestamp_ns(1);
        let line = p.to_line_protocol().unwrap();
        assert!(!line.contains('\n') && !line.contains('\r') && !line.contains('\t'));
        assert_eq!(
            line,
            "fatigue,source=a\\nfatigue\\,host\\=spoofed\\r\\tx value=5i 1"
        );
    }

    #[test]
    fn trailing_backslash_does_not_escape_the_field_separator() {
        let p = Point::new("fatigue")
            .tag("source", "a\\")
            .field("value", FieldValue::Integer(5))
            .timestamp_ns(1);
        assert_eq!(p.to_line_protocol().unwrap(), "fatigue,source=a\\\\ value=5i 1");
    }

    #[test]
    fn backslash_in_measurement_and_keys_is_doubled() {
        let p = Point::new("m\\x")
            .tag("k\\", "v")
            .field("f\\", FieldValue::Integer(1));
        assert_eq!(p.to_line_protocol().unwrap(), "m\\\\x,k\\\\=v f\\\\=1i");
    }

    #[test]
    fn refuses_fieldless_point() {
        let err = Point::new("m").tag("a", "b").to_line_protocol().unwrap_err();
        assert!(matches!(err, FatigueError::StorageWrite(_)));
    }

    #[test]
    fn setting_a_field_twice_replaces_it() {
        let p = Point::new("m")
            .field("v", FieldValue::Integer(1))
            .field("v", FieldValue::Integer(2));
        assert_eq!(p.field_value("v"), Some(&FieldValue::Integer(2)));
        assert_eq!(p.to_line_protocol().unwrap(), "m v=2i");
    }

    #[test]
    fn stamped_now_is_after_2020() {
        let p = Point::new("m").field("v", FieldValue::Integer(1)).stamped_now();
        assert!(p.time().unwrap() > 1_577_836_800_000_000_000);
    }
}
