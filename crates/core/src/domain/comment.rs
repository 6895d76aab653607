use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment owned by exactly one product. The owner is held as a plain id so
/// ownership checks never load the product graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub product_id: ProductId,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewComment {
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl CommentInput {
    pub fn new(description: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self { description: Some(description.into()), date: Some(date.to_rfc3339()) }
    }

    pub fn into_new_comment(self) -> Result<NewComment, DomainError> {
        let description = self
            .description
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| DomainError::InvalidInput("description must not be empty".to_string()))?;

        let raw_date = self
            .date
            .ok_or_else(|| DomainError::InvalidInput("date is required".to_string()))?;
        let date = parse_comment_date(&raw_date).ok_or_else(|| {
            DomainError::InvalidInput(format!("date `{raw_date}` is not an ISO-8601 date string"))
        })?;

        Ok(NewComment { description, date })
    }
}

impl Comment {
    pub fn from_new(id: CommentId, product_id: ProductId, comment: NewComment) -> Self {
        Self { id, product_id, description: comment.description, date: comment.date }
    }
}

/// Accepts an RFC 3339 timestamp, a naive date-time (read as UTC) or a bare
/// calendar date (UTC midnight).
pub fn parse_comment_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{parse_comment_date, CommentInput};
    use crate::errors::DomainError;

    #[test]
    fn parses_supported_date_shapes() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid date");

        assert_eq!(parse_comment_date("2024-01-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse_comment_date("2024-01-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_comment_date("2024-01-01T00:00:00.000"), Some(midnight));
        assert_eq!(parse_comment_date("2024-01-01"), Some(midnight));
        assert_eq!(parse_comment_date("yesterday"), None);
    }

    #[test]
    fn blank_description_is_invalid() {
        let input = CommentInput {
            description: Some("   ".to_string()),
            date: Some("2024-01-01T00:00:00Z".to_string()),
        };

        assert!(matches!(input.into_new_comment(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn missing_date_is_invalid() {
        let input = CommentInput { description: Some("hi".to_string()), date: None };

        assert_eq!(
            input.into_new_comment(),
            Err(DomainError::InvalidInput("date is required".to_string()))
        );
    }
}
