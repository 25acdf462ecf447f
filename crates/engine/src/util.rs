//! Internal helpers for request validation and normalisation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every engine operation rejects bad input the same way,
//! before any row is touched.

use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine, config::MAX_COMMENT_LEN};

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::BadRequest(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Quantities and stakes must be strictly positive.
pub(crate) fn ensure_positive(value: i64, label: &str) -> ResultEngine<()> {
    if value < 1 {
        return Err(EngineError::BadRequest(format!("{label} must be >= 1")));
    }
    Ok(())
}

pub(crate) fn validate_comment(comment: &str) -> ResultEngine<()> {
    if comment.chars().count() > MAX_COMMENT_LEN {
        return Err(EngineError::BadRequest(format!(
            "comment is too long (max {MAX_COMMENT_LEN} characters)"
        )));
    }
    Ok(())
}

/// Lowercase and trim an email address.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: one `@`, both halves present, a dot in the domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

/// Identifier shared by the purchases created in one batch call.
pub(crate) fn batch_id(now: DateTime<Utc>, team_id: i64) -> String {
    format!("{}-{team_id}", now.format("%Y%m%d%H%M%S"))
}
