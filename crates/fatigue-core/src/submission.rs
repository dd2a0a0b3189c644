//! Fatigue score submissions.
//!
//! A submission arrives as a JSON object:
//!
//! ```json
//! { "value": 7, "label": "team-a", "meta": { "userAgent": "Mozilla/5.0 ..." } }
//! ```
//!
//! Validation works on the raw `serde_json::Value` so every failing field is
//! reported at once instead of stopping at the first serde error.

use serde_json::{Map, Value};

use crate::error::{FatigueError, FieldError, Result};
use crate::point::{FieldValue, Point};

/// Measurement name of every stored point.
pub const MEASUREMENT: &str = "fatigue";
/// Tag value used when a submission carries no label.
pub const ANON_SOURCE: &str = "anon";
/// Lowest accepted score.
pub const MIN_VALUE: i64 = 1;
/// Highest accepted score.
pub const MAX_VALUE: i64 = 10;
/// Maximum number of characters kept from `meta.userAgent`.
pub const MAX_USER_AGENT_CHARS: usize = 512;

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub value: i64,
    pub label: Option<String>,
    /// Already truncated to [`MAX_USER_AGENT_CHARS`].
    pub user_agent: Option<String>,
}

impl Submission {
    /// Validate a decoded JSON body.
    pub fn from_json(body: &Value) -> Result<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| FatigueError::invalid(&["body"], "expected a JSON object"))?;

        let mut errors = Vec::new();
        let value = parse_value(obj, &mut errors);
        let label = parse_label(obj, &mut errors);
        let user_agent = parse_meta(obj, &mut errors);

        match value {
            Some(value) if errors.is_empty() => Ok(Self {
                value,
                label,
                user_agent,
            }),
            _ => Err(FatigueError::Validation(errors)),
        }
    }

    /// Tag value for `source`.
    pub fn source(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => ANON_SOURCE,
        }
    }

    /// Build the point stored for this submission.
    pub fn to_point(&self, host: &str) -> Point {
        let mut point = Point::new(MEASUREMENT)
            .field("value", FieldValue::Integer(self.value))
            .tag("source", self.source())
            .tag("host", host);
        if let Some(ua) = &self.user_agent {
            point = point.field("ua", FieldValue::String(ua.clone()));
        }
        point
    }
}

fn parse_value(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<i64> {
    let loc = ["body", "value"];
    let Some(raw) = obj.get("value") else {
        errors.push(FieldError::new(&loc, "field required"));
        return None;
    };
    let Some(n) = raw.as_i64() else {
        errors.push(FieldError::new(&loc, "value is not a valid integer"));
        return None;
    };
    if !(MIN_VALUE..=MAX_VALUE).contains(&n) {
        errors.push(FieldError::new(
            &loc,
            format!("value must be between {MIN_VALUE} and {MAX_VALUE}"),
        ));
        return None;
    }
    Some(n)
}

fn parse_label(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match obj.get("label") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(&["body", "label"], "value is not a valid string"));
            None
        }
    }
}

fn parse_meta(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match obj.get("meta") {
        None | Some(Value::Null) => None,
        Some(Value::Object(meta)) => meta.get("userAgent").and_then(user_agent),
        Some(_) => {
            errors.push(FieldError::new(&["body", "meta"], "value is not a valid object"));
            None
        }
    }
}

/// Render `meta.userAgent`; falsy values (null, false, 0, "", [], {}) are skipped.
fn user_agent(raw: &Value) -> Option<String> {
    let rendered = match raw {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Array(a) if a.is_empty() => return None,
        Value::Object(o) if o.is_empty() => return None,
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        // Numbers, arrays and objects keep their compact JSON text.
        other => other.to_string(),
    };
    Some(truncate_chars(&rendered, MAX_USER_AGENT_CHARS))
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: FatigueError) -> Vec<FieldError> {
        match err {
            FatigueError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_every_score_in_range() {
        for v in MIN_VALUE..=MAX_VALUE {
            let s = Submission::from_json(&json!({ "value": v })).unwrap();
            assert_eq!(s.value, v);
        }
    }

    #[test]
    fn rejects_out_of_range_and_non_integers() {
        for bad in [json!(0), json!(11), json!(-3), json!(5.5), json!(5.0), json!("5"), json!(true), json!(null)] {
            let errs = field_errors(Submission::from_json(&json!({ "value": bad })).unwrap_err());
            assert_eq!(errs.len(), 1, "input {bad}");
            assert_eq!(errs[0].loc, vec!["body", "value"]);
        }
    }

    #[test]
    fn missing_value_is_required() {
        let errs = field_errors(Submission::from_json(&json!({ "label": "x" })).unwrap_err());
        assert_eq!(errs, vec![FieldError::new(&["body", "value"], "field required")]);
    }

    #[test]
    fn reports_every_bad_field() {
        let errs = field_errors(
            Submission::from_json(&json!({ "value": 42, "label": 3, "meta": "ua" })).unwrap_err(),
        );
        let locs: Vec<_> = errs.iter().map(|e| e.loc[1].as_str()).collect();
        assert_eq!(locs, vec!["value", "label", "meta"]);
    }

    #[test]
    fn non_object_body_is_rejected() {
        let errs = field_errors(Submission::from_json(&json!([1, 2])).unwrap_err());
        assert_eq!(errs[0].loc, vec!["body"]);
    }

    #[test]
    fn label_defaults_to_anon() {
        for body in [json!({ "value": 3 }), json!({ "value": 3, "label": null }), json!({ "value": 3, "label": "" })] {
            let s = Submission::from_json(&body).unwrap();
            assert_eq!(s.source(), ANON_SOURCE);
        }
        let s = Submission::from_json(&json!({ "value": 3, "label": "night-shift" })).unwrap();
        assert_eq!(s.source(), "night-shift");
    }

    #[test]
    fn user_agent_is_truncated_to_512_chars() {
        let long = "é".repeat(600);
        let s = Submission::from_json(&json!({ "value": 1, "meta": { "userAgent": long } })).unwrap();
        assert_eq!(s.user_agent.unwrap().chars().count(), MAX_USER_AGENT_CHARS);
    }

    #[test]
    fn falsy_user_agent_is_dropped_and_other_meta_ignored() {
        for ua in [json!(""), json!(null), json!(false), json!(0), json!([])] {
            let s = Submission::from_json(&json!({ "value": 1, "meta": { "userAgent": ua } })).unwrap();
            assert!(s.user_agent.is_none());
        }
        let s = Submission::from_json(&json!({ "value": 1, "meta": { "lang": "fr" } })).unwrap();
        assert!(s.user_agent.is_none());
    }

    #[test]
    fn non_string_user_agent_is_stringified() {
        let s = Submission::from_json(&json!({ "value": 1, "meta": { "userAgent": 42 } })).unwrap();
        assert_eq!(s.user_agent.as_deref(), Some("42"));
        let s = Submission::from_json(&json!({ "value": 1, "meta": { "userAgent": true } })).unwrap();
        assert_eq!(s.user_agent.as_deref(), Some("True"));
        let s = Submission::from_json(&json!({ "value": 1, "meta": { "userAgent": { "a": 1 } } })).unwrap();
        assert_eq!(s.user_agent.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn point_carries_schema_fields_and_tags() {
        let s = Submission::from_json(&json!({
            "value": 9,
            "meta": { "userAgent": "curl/8.0" }
        }))
        .unwrap();
        let p = s.to_point("box-1");
        assert_eq!(p.measurement(), MEASUREMENT);
        assert_eq!(p.field_value("value"), Some(&FieldValue::Integer(9)));
        assert_eq!(p.field_value("ua"), Some(&FieldValue::String("curl/8.0".into())));
        assert_eq!(p.tag_value("source"), Some("anon"));
        assert_eq!(p.tag_value("host"), Some("box-1"));
        assert_eq!(
            p.to_line_protocol().unwrap(),
            "fatigue,host=box-1,source=anon value=9i,ua=\"curl/8.0\""
        );
    }
}
