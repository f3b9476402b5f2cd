use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::null_as_default;

/// Opaque continuation token from a list endpoint.
///
/// The backend sends it as a string or a number; either way it goes back
/// verbatim in the `cursor` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Cursor(s)),
            Value::Number(n) => Ok(Cursor(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "cursor must be a string or number, got {}",
                other
            ))),
        }
    }
}

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(
        alias = "posts",
        alias = "comments",
        default = "Vec::new",
        deserialize_with = "null_as_default"
    )]
    pub items: Vec<T>,
    #[serde(rename = "hasNext", alias = "hasMore", default, deserialize_with = "null_as_default")]
    pub has_next: bool,
    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next: bool, next_cursor: Option<Cursor>) -> Self {
        Self {
            items,
            has_next,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostSummary;

    #[test]
    fn test_parse_post_page() {
        let json = r#"{"posts": [{"id": 1, "title": "a"}, {"id": 2, "title": "b"}], "hasNext": true, "nextCursor": "c1"}"#;
        let page: Page<PostSummary> = serde_json::from_str(json).expect("Failed to parse page");
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next);
        assert_eq!(page.next_cursor, Some(Cursor::new("c1")));
    }

    #[test]
    fn test_parse_last_empty_page() {
        let json = r#"{"posts": [], "hasNext": false, "nextCursor": null}"#;
        let page: Page<PostSummary> = serde_json::from_str(json).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let page: Page<PostSummary> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);

        let page: Page<PostSummary> = serde_json::from_str(r#"{"posts": null}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_numeric_cursor() {
        let page: Page<PostSummary> =
            serde_json::from_str(r#"{"posts": [], "hasNext": true, "nextCursor": 1042}"#).unwrap();
        assert_eq!(page.next_cursor.map(|c| c.as_str().to_string()), Some("1042".to_string()));
    }
}
