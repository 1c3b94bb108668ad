//! Declarative request-body checks.
//!
//! Rules run against the raw JSON body before it is decoded into a typed
//! request, so a missing field yields a readable message instead of a serde
//! error. All rules run; every failure is reported in rule order.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Field must be present, non-null and truthy.
    Required {
        field: &'static str,
        message: &'static str,
    },
    /// Field, when present, must be an email address.
    Email {
        field: &'static str,
        message: &'static str,
    },
}

pub const fn required(field: &'static str, message: &'static str) -> Rule {
    Rule::Required { field, message }
}

pub const fn email(field: &'static str, message: &'static str) -> Rule {
    Rule::Email { field, message }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl Rule {
    fn check(&self, body: &Value) -> Option<&'static str> {
        match *self {
            Rule::Required { field, message } => match body.get(field) {
                Some(v) if !is_falsy(v) => None,
                _ => Some(message),
            },
            Rule::Email { field, message } => match body.get(field) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s.is_empty() || is_valid_email(s) => None,
                Some(_) => Some(message),
            },
        }
    }
}

pub fn validate(body: &Value, rules: &[Rule]) -> Result<(), ApiError> {
    if !body.is_object() {
        return Err(ApiError::validation("Request body must be a JSON object"));
    }
    let errors: Vec<String> = rules
        .iter()
        .filter_map(|rule| rule.check(body))
        .map(String::from)
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Decodes an already validated body into its typed form.
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))
}

/// Parses a raw body inside a handler, for pipelines that must finish other
/// checks before the body is looked at.
pub fn parse_json(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::validation(format!("Failed to parse the request body as JSON: {e}")))
}

/// `Json` extractor whose rejection is a JSON `errors` body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULES: &[Rule] = &[
        required("title", "title missing"),
        required("emailAddress", "email missing"),
        email("emailAddress", "email invalid"),
    ];

    fn errors(body: Value) -> Vec<String> {
        match validate(&body, RULES) {
            Ok(()) => vec![],
            Err(ApiError::Validation(e)) => e,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn passes_valid_body() {
        assert!(errors(json!({"title": "Rust", "emailAddress": "a@b.io"})).is_empty());
    }

    #[test]
    fn reports_all_missing_fields_in_order() {
        assert_eq!(errors(json!({})), vec!["title missing", "email missing"]);
    }

    #[test]
    fn falsy_values_count_as_missing() {
        let got = errors(json!({"title": "", "emailAddress": null}));
        assert_eq!(got, vec!["title missing", "email missing"]);
        assert_eq!(
            errors(json!({"title": false, "emailAddress": "a@b.io"})),
            vec!["title missing"]
        );
        assert_eq!(
            errors(json!({"title": 0, "emailAddress": "a@b.io"})),
            vec!["title missing"]
        );
    }

    #[test]
    fn whitespace_is_present() {
        assert!(errors(json!({"title": " ", "emailAddress": "a@b.io"})).is_empty());
    }

    #[test]
    fn bad_email_is_reported_once() {
        assert_eq!(
            errors(json!({"title": "x", "emailAddress": "not-an-email"})),
            vec!["email invalid"]
        );
        assert_eq!(
            errors(json!({"title": "x", "emailAddress": 42})),
            vec!["email invalid"]
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(errors(json!([1, 2])), vec!["Request body must be a JSON object"]);
    }

    #[test]
    fn email_regex() {
        assert!(is_valid_email("joe@smith.com"));
        assert!(!is_valid_email("joe@smith"));
        assert!(!is_valid_email("joe smith@x.com"));
    }

    #[test]
    fn parse_json_treats_empty_body_as_empty_object() {
        assert_eq!(parse_json(b"").unwrap(), json!({}));
        assert_eq!(parse_json(br#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(matches!(parse_json(b"{oops"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn decode_reports_type_errors() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Body {
            title: String,
        }
        let err = decode::<Body>(json!({"title": 5})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref e) if e[0].starts_with("Invalid request body")));
    }
}
