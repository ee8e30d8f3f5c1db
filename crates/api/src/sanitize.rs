//! Request body sanitization.
//!
//! Applied to every JSON body before it is deserialized:
//! - object keys starting with `$` or containing `.` are dropped, so operator
//!   or dotted-path keys never reach a query;
//! - `<` in string values is escaped to `&lt;`.

use serde_json::{Map, Value};

/// Sanitize a JSON value recursively.
pub fn clean(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !is_operator_key(key))
                .map(|(key, v)| (key, clean(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(clean).collect()),
        Value::String(s) => Value::String(escape_html(&s)),
        other => other,
    }
}

fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

fn escape_html(s: &str) -> String {
    if s.contains('<') {
        s.replace('<', "&lt;")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_operator_and_dotted_keys_at_any_depth() {
        let dirty = json!({
            "email": { "$gt": "" },
            "name": "Jonas",
            "profile.admin": true,
            "nested": [{ "$where": "1 == 1", "ok": 1 }]
        });
        assert_eq!(
            clean(dirty),
            json!({
                "email": {},
                "name": "Jonas",
                "nested": [{ "ok": 1 }]
            })
        );
    }

    #[test]
    fn escapes_markup_in_strings() {
        let dirty = json!({ "name": "<div id='bad-code'>Name</div>" });
        assert_eq!(
            clean(dirty),
            json!({ "name": "&lt;div id='bad-code'>Name&lt;/div>" })
        );
    }

    #[test]
    fn leaves_scalars_alone() {
        assert_eq!(clean(json!(42)), json!(42));
        assert_eq!(clean(json!(null)), json!(null));
        assert_eq!(clean(json!("plain")), json!("plain"));
    }
}
