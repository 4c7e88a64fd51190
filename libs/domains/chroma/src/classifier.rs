//! Classification of failed server responses.
//!
//! The server reports errors in several shapes:
//!
//! ```text
//! {"error": "NotFoundError('Collection test does not exist')"}   typed
//! {"detail": "Collection test does not exist."}                  detail
//! {"error": "dimensionality mismatch: got 11 expected 10"}       plain
//! ```
//!
//! and occasionally wraps one of them a second time as an escaped string.
//! Each shape is handled by one matcher; matchers are tried in order and the
//! first hit decides the error kind.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiErrorKind, ChromaError};

static TYPED_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?P<type>\w+)\((?P<message>.*)\)$").unwrap());

static ESCAPED_ERROR_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)\{\s*\\"error\\"\s*:\s*\\".*?\\"\s*\}"#).unwrap());

/// A pure function recognizing one error shape, yielding `(type name, message)`.
pub type ShapeMatcher = fn(&Value) -> Option<(String, String)>;

/// Shape matchers in priority order.
pub const SHAPE_MATCHERS: &[ShapeMatcher] = &[match_typed_error, match_detail, match_plain_error];

/// Turn a failed response into a typed error.
///
/// The message and `status` are carried unmodified. When no known shape is
/// recognized the raw body becomes the message of a `Generic` error.
pub fn classify(body: &str, status: u16) -> ChromaError {
    let candidate = unwrap_double_encoded(body);

    let matched = serde_json::from_str::<Value>(&candidate)
        .ok()
        .and_then(|parsed| SHAPE_MATCHERS.iter().find_map(|matcher| matcher(&parsed)));

    let (kind, message) = match matched {
        Some((type_name, message)) => (ApiErrorKind::from_type_name(&type_name), message),
        None => (ApiErrorKind::Generic, raw_message(body, status)),
    };

    warn!(status, kind = %kind, message = %message, "Chroma request failed");

    ChromaError::Api {
        kind,
        message,
        code: status,
    }
}

/// Infer a server error type name from free-form message text.
///
/// Case-sensitive substring search; the first entry that matches wins.
pub fn infer_type_name(message: &str) -> &'static str {
    const MARKERS: &[(&str, &str)] = &[
        ("NotFoundError", "NotFoundError"),
        ("AuthorizationError", "AuthorizationError"),
        ("UniqueConstraintError", "UniqueConstraintError"),
        ("ValueError", "ValueError"),
        ("dimensionality", "DimensionalityError"),
    ];

    MARKERS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, type_name)| *type_name)
        .unwrap_or("UnknownError")
}

/// `{"error": "TypeName(message)"}`
pub fn match_typed_error(parsed: &Value) -> Option<(String, String)> {
    let error = parsed.get("error")?.as_str()?;
    let captures = TYPED_ERROR.captures(error)?;

    let type_name = captures.name("type")?.as_str().to_string();
    let message = strip_quotes(captures.name("message")?.as_str()).to_string();

    Some((type_name, message))
}

/// `{"detail": "..."}` or a validation list `{"detail": [{"msg": "..."}]}`.
pub fn match_detail(parsed: &Value) -> Option<(String, String)> {
    let message = match parsed.get("detail")? {
        Value::String(detail) => detail.clone(),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => entry.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => return None,
        other => other.to_string(),
    };

    Some((infer_type_name(&message).to_string(), message))
}

/// `{"error": "..."}` without a type prefix.
pub fn match_plain_error(parsed: &Value) -> Option<(String, String)> {
    let message = parsed.get("error")?.as_str()?.to_string();
    Some((infer_type_name(&message).to_string(), message))
}

fn unwrap_double_encoded(body: &str) -> Cow<'_, str> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(inner)) => Cow::Owned(inner),
        Ok(Value::Object(outer)) => match outer.get("error").and_then(Value::as_str) {
            Some(inner) if is_json_object(inner) => Cow::Owned(inner.to_string()),
            _ => Cow::Borrowed(body),
        },
        Ok(_) => Cow::Borrowed(body),
        Err(_) => unescape_embedded_error(body).map_or(Cow::Borrowed(body), Cow::Owned),
    }
}

fn is_json_object(text: &str) -> bool {
    matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_)))
}

/// Escaped error object inside a body that is not JSON itself.
fn unescape_embedded_error(body: &str) -> Option<String> {
    let found = ESCAPED_ERROR_OBJECT.find(body)?;
    serde_json::from_str::<String>(&format!("\"{}\"", found.as_str())).ok()
}

fn strip_quotes(message: &str) -> &str {
    for quote in ['\'', '"'] {
        if message.len() >= 2 && message.starts_with(quote) && message.ends_with(quote) {
            return &message[1..message.len() - 1];
        }
    }
    message
}

fn raw_message(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn kind_and_message(err: ChromaError) -> (ApiErrorKind, String, u16) {
        match err {
            ChromaError::Api {
                kind,
                message,
                code,
            } => (kind, message, code),
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[test]
    fn test_typed_error_shape() {
        let body = r#"{"error": "NotFoundError('Collection test does not exist')"}"#;
        let (kind, message, code) = kind_and_message(classify(body, 500));

        assert_eq!(kind, ApiErrorKind::NotFound);
        assert_eq!(message, "Collection test does not exist");
        assert_eq!(code, 500);
    }

    #[test]
    fn test_detail_without_marker_is_generic() {
        let body = r#"{"detail": "Collection test_collection_2 does not exist."}"#;
        let (kind, message, code) = kind_and_message(classify(body, 400));

        assert_eq!(kind, ApiErrorKind::Generic);
        assert_eq!(message, "Collection test_collection_2 does not exist.");
        assert_eq!(code, 400);
    }

    #[test]
    fn test_plain_error_with_dimensionality() {
        let body = r#"{"error": "dimensionality mismatch: got 11 expected 10"}"#;
        let (kind, message, _) = kind_and_message(classify(body, 500));

        assert_eq!(kind, ApiErrorKind::Dimensionality);
        assert_eq!(message, "dimensionality mismatch: got 11 expected 10");
    }

    #[test]
    fn test_typed_error_dispatches_every_known_type() {
        let cases = [
            ("ValueError('bad where')", ApiErrorKind::Value, "bad where"),
            (
                "UniqueConstraintError('Collection test already exists')",
                ApiErrorKind::UniqueConstraint,
                "Collection test already exists",
            ),
            (
                "TypeError(\"Expected embeddings to be a list\")",
                ApiErrorKind::Type,
                "Expected embeddings to be a list",
            ),
            (
                "InvalidCollection('broken')",
                ApiErrorKind::InvalidCollection,
                "broken",
            ),
            (
                "AuthorizationError('Unauthorized')",
                ApiErrorKind::Authorization,
                "Unauthorized",
            ),
            (
                "InvalidDimensionException('Embedding dimension 11 does not match collection dimensionality 10')",
                ApiErrorKind::Generic,
                "Embedding dimension 11 does not match collection dimensionality 10",
            ),
        ];

        for (error, expected_kind, expected_message) in cases {
            let body = json!({ "error": error }).to_string();
            let (kind, message, _) = kind_and_message(classify(&body, 500));
            assert_eq!(kind, expected_kind, "{}", error);
            assert_eq!(message, expected_message, "{}", error);
        }
    }

    #[test]
    fn test_quotes_stripped_only_when_on_both_ends() {
        let body = json!({ "error": "ValueError('unbalanced)" }).to_string();
        let (_, message, _) = kind_and_message(classify(&body, 500));
        assert_eq!(message, "'unbalanced");

        let body = json!({ "error": "ValueError(''twice'')" }).to_string();
        let (_, message, _) = kind_and_message(classify(&body, 500));
        assert_eq!(message, "'twice'");
    }

    #[test]
    fn test_inference_order_first_match_wins() {
        assert_eq!(
            infer_type_name("NotFoundError raised while handling ValueError"),
            "NotFoundError"
        );
        assert_eq!(
            infer_type_name("ValueError: dimensionality of 3"),
            "ValueError"
        );
        assert_eq!(
            infer_type_name("UniqueConstraintError and AuthorizationError"),
            "AuthorizationError"
        );
        assert_eq!(infer_type_name("Dimensionality mismatch"), "UnknownError");
        assert_eq!(infer_type_name("anything else"), "UnknownError");
    }

    #[test]
    fn test_detail_with_marker() {
        let body = r#"{"detail": "ValueError: Collection test_collection_2 does not exist."}"#;
        let (kind, message, _) = kind_and_message(classify(body, 500));

        assert_eq!(kind, ApiErrorKind::Value);
        assert_eq!(message, "ValueError: Collection test_collection_2 does not exist.");
    }

    #[test]
    fn test_detail_validation_list() {
        let body = json!({
            "detail": [
                {"loc": ["body", "ids"], "msg": "field required", "type": "value_error.missing"},
                {
                    "loc": ["body", "n_results"],
                    "msg": "value is not a valid integer",
                    "type": "type_error.integer"
                }
            ]
        })
        .to_string();
        let (kind, message, code) = kind_and_message(classify(&body, 422));

        assert_eq!(kind, ApiErrorKind::Generic);
        assert_eq!(message, "field required\nvalue is not a valid integer");
        assert_eq!(code, 422);
    }

    #[test]
    fn test_typed_shape_takes_precedence_over_detail() {
        let body = json!({
            "error": "NotFoundError('missing')",
            "detail": "ValueError here"
        })
        .to_string();
        let (kind, message, _) = kind_and_message(classify(&body, 500));

        assert_eq!(kind, ApiErrorKind::NotFound);
        assert_eq!(message, "missing");
    }

    #[test]
    fn test_detail_takes_precedence_over_plain_error() {
        let body = json!({
            "error": "dimensionality problem",
            "detail": "UniqueConstraintError: already exists"
        })
        .to_string();
        let (kind, _, _) = kind_and_message(classify(&body, 500));

        assert_eq!(kind, ApiErrorKind::UniqueConstraint);
    }

    #[test]
    fn test_double_encoded_string_body() {
        let inner = json!({ "error": "NotFoundError('Collection x does not exist')" }).to_string();
        let body = serde_json::to_string(&inner).unwrap();
        let (kind, message, _) = kind_and_message(classify(&body, 500));

        assert_eq!(kind, ApiErrorKind::NotFound);
        assert_eq!(message, "Collection x does not exist");
    }

    #[test]
    fn test_double_encoded_inside_outer_object() {
        let body = r#"{"error":"{\"error\":\"ValueError('bad operator $foo')\"}"}"#;
        let (kind, message, _) = kind_and_message(classify(body, 500));

        assert_eq!(kind, ApiErrorKind::Value);
        assert_eq!(message, "bad operator $foo");
    }

    #[test]
    fn test_double_encoded_with_escaped_quotes_in_message() {
        let inner = json!({ "error": "NotFoundError(\"Collection 'docs' does not exist\")" });
        let body = json!({ "error": inner.to_string() }).to_string();
        let (kind, message, code) = kind_and_message(classify(&body, 500));

        assert_eq!(kind, ApiErrorKind::NotFound);
        assert_eq!(message, "Collection 'docs' does not exist");
        assert_eq!(code, 500);
    }

    #[test]
    fn test_escaped_error_object_inside_plain_text() {
        let body = concat!(
            r#"upstream failed: {\"error\":"#,
            r#"\"NotFoundError(\\\"Collection 'docs' does not exist\\\")\"}"#
        );
        let (kind, message, _) = kind_and_message(classify(body, 500));

        assert_eq!(kind, ApiErrorKind::NotFound);
        assert_eq!(message, "Collection 'docs' does not exist");
    }

    #[test]
    fn test_unparseable_body_is_generic_with_raw_text() {
        let (kind, message, code) = kind_and_message(classify("Internal Server Error", 502));

        assert_eq!(kind, ApiErrorKind::Generic);
        assert_eq!(message, "Internal Server Error");
        assert_eq!(code, 502);
    }

    #[test]
    fn test_unknown_shape_is_generic() {
        let (kind, message, _) = kind_and_message(classify(r#"{"status": "down"}"#, 503));
        assert_eq!(kind, ApiErrorKind::Generic);
        assert_eq!(message, r#"{"status": "down"}"#);

        let (kind, _, _) = kind_and_message(classify("[1, 2]", 500));
        assert_eq!(kind, ApiErrorKind::Generic);
    }

    #[test]
    fn test_empty_body_mentions_status() {
        let (kind, message, code) = kind_and_message(classify("", 404));

        assert_eq!(kind, ApiErrorKind::Generic);
        assert_eq!(message, "Request failed with status 404");
        assert_eq!(code, 404);
    }

    #[test]
    fn test_matchers_are_independent() {
        let typed = json!({ "error": "ValueError('x')" });
        let detail = json!({ "detail": "x" });
        let plain = json!({ "error": "x" });

        assert!(match_typed_error(&typed).is_some());
        assert!(match_typed_error(&plain).is_none());
        assert!(match_detail(&detail).is_some());
        assert!(match_detail(&typed).is_none());
        assert_eq!(
            match_plain_error(&plain),
            Some(("UnknownError".to_string(), "x".to_string()))
        );
        assert!(match_plain_error(&detail).is_none());
    }
}
