//! Path templating and query string encoding

use std::collections::HashMap;

use serde_json::Value;

/// Substitute `:name` placeholders in `endpoint` with percent-encoded values.
///
/// Placeholders without a matching parameter are left untouched.
#[must_use]
pub fn build_url<S: std::hash::BuildHasher>(
    endpoint: &str,
    params: &HashMap<&str, String, S>,
) -> String {
    let mut out = String::with_capacity(endpoint.len());
    let mut rest = endpoint;

    while let Some(pos) = rest.find(':') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(after.len());
        let name = &after[..len];

        match params.get(name) {
            Some(value) if !name.is_empty() => out.push_str(&urlencoding::encode(value)),
            _ => {
                out.push(':');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}

/// Encode query parameters, skipping null and empty-string values.
///
/// Returns an empty string when nothing remains, otherwise the query with a
/// leading `?`. Arrays produce one pair per element.
#[must_use]
pub fn build_query_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut appended = false;

    for (key, value) in params {
        let values = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        };
        for value in values {
            if let Some(text) = query_value(value) {
                serializer.append_pair(key, &text);
                appended = true;
            }
        }
    }

    if appended {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_build_url_substitutes_params() {
        let params = HashMap::from([("slug", "red bike".to_string()), ("id", "42".to_string())]);
        assert_eq!(build_url("/api/ads/:slug/images/:id/", &params), "/api/ads/red%20bike/images/42/");
    }

    #[test]
    fn test_build_url_leaves_unknown_placeholders() {
        let params: HashMap<&str, String> = HashMap::new();
        assert_eq!(build_url("/api/ads/:slug/", &params), "/api/ads/:slug/");
        assert_eq!(build_url("http://host:8000/x", &params), "http://host:8000/x");
    }

    #[test]
    fn test_build_query_string() {
        let page = json!(2);
        let search = json!("used cars");
        let empty = json!("");
        let null = Value::Null;
        let query =
            build_query_string([("page", &page), ("search", &search), ("q", &empty), ("c", &null)]);
        assert_eq!(query, "?page=2&search=used+cars");
    }

    #[test]
    fn test_build_query_string_empty() {
        let null = Value::Null;
        assert_eq!(build_query_string([("c", &null)]), "");
    }
}
