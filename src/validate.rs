//! Input validation. Everything here runs before the first write.

use crate::error::{CrmError, Result};
use crate::types::{AssignableKind, Assignee, AssigneeKind, Recurrence};
use chrono::{DateTime, Utc};

/// Maximum length of a task or event title.
pub const MAX_TITLE_LEN: usize = 255;

pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CrmError::missing_field("title"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CrmError::invalid(
            "title",
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end <= start {
        return Err(CrmError::invalid("end", "end must be after start"));
    }
    Ok(())
}

pub fn validate_recurrence(rule: &Recurrence, start: DateTime<Utc>) -> Result<()> {
    if rule.interval < 1 {
        return Err(CrmError::invalid("recurrence.interval", "interval must be at least 1"));
    }
    if let Some(until) = rule.until
        && until < start
    {
        return Err(CrmError::invalid(
            "recurrence.until",
            "until must not be before the event start",
        ));
    }
    Ok(())
}

/// Turn the raw `assigned_to` / `assigned_to_type` pair into an [`Assignee`].
///
/// Both must be present or both absent.
pub fn resolve_assignee(
    assigned_to: Option<&str>,
    assigned_to_type: Option<AssigneeKind>,
    target: AssignableKind,
) -> Result<Option<Assignee>> {
    match (assigned_to.map(str::trim), assigned_to_type) {
        (None, None) => Ok(None),
        (Some(""), _) => Err(CrmError::invalid("assigned_to", "must not be empty")),
        (Some(_), None) => Err(CrmError::invalid(
            "assigned_to_type",
            "assigned_to_type is required when assigned_to is set",
        )),
        (None, Some(_)) => Err(CrmError::invalid(
            "assigned_to",
            "assigned_to is required when assigned_to_type is set",
        )),
        (Some(id), Some(kind)) => {
            check_assignable(target, kind)?;
            Ok(Some(Assignee::from_parts(kind, id)))
        }
    }
}

pub fn check_assignable(target: AssignableKind, kind: AssigneeKind) -> Result<()> {
    if !target.accepts(kind) {
        return Err(CrmError::invalid(
            "assigned_to_type",
            format!("a {} cannot be assigned to a {}", target.as_str(), kind.as_str()),
        ));
    }
    Ok(())
}
