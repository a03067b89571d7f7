//! Copy (physical volume) model and request types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::FieldErrors;

use super::reference::EntityRef;

/// Full copy model from database. `book` is a reduced view of the referenced
/// book, loaded separately; orphaned copies carry none.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Copy {
    pub id: i64,
    pub book_id: Option<i64>,
    pub lent: bool,
    pub lent_by: Option<String>,
    pub return_date: Option<NaiveDate>,
    #[sqlx(skip)]
    #[serde(default)]
    pub book: Option<BookSummary>,
}

/// Reduced book representation shown inside copies
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub title: String,
    pub rating: f64,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Reduced copy representation shown inside books
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CopySummary {
    pub lent: bool,
    pub lent_by: Option<String>,
    pub return_date: Option<NaiveDate>,
}

/// Create copy request; also used for PUT, where the payload alone is the
/// effective state (`lent` defaults to false).
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCopy {
    /// Book reference: id, title, or embedded book object
    #[schema(value_type = Option<Object>)]
    pub book: Option<EntityRef>,
    #[serde(default)]
    pub lent: bool,
    pub lent_by: Option<String>,
    pub return_date: Option<NaiveDate>,
}

/// Partial copy update. Absent fields fall back to the stored row before the
/// lending rule is evaluated, while an explicit `null` clears the field —
/// the outer `Option` is presence, the inner one the value. A `null` book
/// detaches the copy; a `null` `lent_by` or `return_date` on a lent copy
/// fails the lending rule.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCopy {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub book: Option<Option<EntityRef>>,
    pub lent: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub lent_by: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub return_date: Option<Option<NaiveDate>>,
}

/// Any value present in the payload deserializes to `Some(...)`; the field
/// default (`None`) is only used when the key is missing entirely.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Copy list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct CopyQuery {
    /// Case-insensitive exact match on the referenced book's title
    pub book: Option<String>,
    /// Case-insensitive exact match on a genre of the referenced book
    pub genre: Option<String>,
    /// `true` or `false`, case-insensitive
    pub lent: Option<String>,
    /// Column name, `-` prefix for descending
    pub ordering: Option<String>,
}

/// Lending fields are required together: `lent = true` demands both
/// `lent_by` and `return_date`. Every missing field is reported.
pub fn validate_lending(
    lent: bool,
    lent_by: Option<&str>,
    return_date: Option<NaiveDate>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if lent {
        if lent_by.map_or(true, |s| s.trim().is_empty()) {
            errors.push("lent_by", "This field is required when the copy is lent.");
        }
        if return_date.is_none() {
            errors.push("return_date", "This field is required when the copy is lent.");
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn lent_with_both_fields_is_valid() {
        let errors = validate_lending(true, Some("Ali"), Some(date("2025-08-01")));
        assert!(errors.is_empty());
    }

    #[test]
    fn lent_without_lent_by_reports_lent_by() {
        let errors = validate_lending(true, None, Some(date("2025-08-01")));
        assert!(errors.0.contains_key("lent_by"));
        assert!(!errors.0.contains_key("return_date"));
    }

    #[test]
    fn lent_without_return_date_reports_return_date() {
        let errors = validate_lending(true, Some("Ali"), None);
        assert!(errors.0.contains_key("return_date"));
    }

    #[test]
    fn both_missing_fields_are_reported_together() {
        let errors = validate_lending(true, None, None);
        assert_eq!(errors.0.len(), 2);
    }

    #[test]
    fn not_lent_skips_the_rule() {
        assert!(validate_lending(false, None, None).is_empty());
    }

    #[test]
    fn blank_lent_by_counts_as_missing() {
        let errors = validate_lending(true, Some("   "), Some(date("2025-08-01")));
        assert!(errors.0.contains_key("lent_by"));
    }

    #[test]
    fn patch_payload_distinguishes_null_from_absent() {
        let update: UpdateCopy = serde_json::from_str(r#"{"lent_by": null}"#).unwrap();
        assert_eq!(update.lent_by, Some(None));
        assert_eq!(update.return_date, None);
        assert!(update.book.is_none());

        let update: UpdateCopy = serde_json::from_str(r#"{"lent_by": "Ali"}"#).unwrap();
        assert_eq!(update.lent_by, Some(Some("Ali".to_string())));
    }

    #[test]
    fn patch_payload_null_book_is_present_and_cleared() {
        let update: UpdateCopy =
            serde_json::from_str(r#"{"book": null, "return_date": null}"#).unwrap();
        assert!(matches!(update.book, Some(None)));
        assert_eq!(update.return_date, Some(None));
    }
}
