//! Request input checks that run before any store access.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse an identifier-shaped input. Empty or malformed values fail with
/// `InvalidReference` naming `field`.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_reference(field, raw));
    }
    Uuid::parse_str(trimmed).map_err(|_| ApiError::invalid_reference(field, raw))
}

/// Treat blank strings as absent. Non-blank values are kept as sent.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Take a required text field, failing with `ValidationError` when absent or blank
pub fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    present(value).ok_or_else(|| ApiError::validation_error(format!("{} is required", field), None))
}

/// Fail with `ValidationError` listing every field whose value is absent or blank
pub fn require_all(fields: &[(&str, Option<&str>)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    match missing.first() {
        None => Ok(()),
        Some(first) => {
            let field_errors: BTreeMap<String, String> = missing
                .iter()
                .map(|name| (name.to_string(), "This field is required".to_string()))
                .collect();
            Err(ApiError::validation_error(
                format!("{} is required", first),
                Some(field_errors),
            ))
        }
    }
}

/// Fail with `ValidationError` unless at least one of `fields` is present
pub fn require_any(fields: &[(&str, bool)]) -> Result<(), ApiError> {
    if fields.iter().any(|(_, present)| *present) {
        return Ok(());
    }
    let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    Err(ApiError::validation_error(
        format!("At least one of {} is required", names.join(", ")),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_ids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("videoId", &id.to_string()).unwrap(), id);
        assert_eq!(parse_id("videoId", &format!(" {} ", id)).unwrap(), id);
    }

    #[test]
    fn rejects_empty_and_malformed_ids() {
        for raw in ["", "  ", "abc", "123", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            match parse_id("playlistId", raw) {
                Err(ApiError::InvalidReference { field, value }) => {
                    assert_eq!(field, "playlistId");
                    assert_eq!(value, raw);
                }
                other => panic!("expected InvalidReference for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn require_all_reports_every_missing_field() {
        let err = require_all(&[("name", None), ("description", Some("  ")), ("owner", Some("x"))]).unwrap_err();
        match err {
            ApiError::ValidationError { message, field_errors } => {
                assert_eq!(message, "name is required");
                let fields = field_errors.unwrap();
                assert!(fields.contains_key("name"));
                assert!(fields.contains_key("description"));
                assert!(!fields.contains_key("owner"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn require_all_names_the_first_declared_field() {
        let err = require_all(&[("title", None), ("description", None)]).unwrap_err();
        assert_eq!(err.message(), "title is required");
    }

    #[test]
    fn require_all_passes_when_present() {
        assert!(require_all(&[("content", Some("hello"))]).is_ok());
    }

    #[test]
    fn require_any_needs_one() {
        assert!(require_any(&[("name", false), ("description", true)]).is_ok());
        let err = require_any(&[("name", false), ("description", false)]).unwrap_err();
        assert_eq!(err.message(), "At least one of name, description is required");
    }

    #[test]
    fn required_keeps_content_and_rejects_blank() {
        assert_eq!(required("content", Some("  indented\n".into())).unwrap(), "  indented\n");
        let err = required("content", Some("".into())).unwrap_err();
        assert_eq!(err.message(), "content is required");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn present_drops_blank() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(Some(" hi ".into())), Some(" hi ".into()));
        assert_eq!(present(None), None);
    }
}
