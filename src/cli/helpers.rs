//! Shared helper functions for CLI commands

use console::style;

use crate::core::entity::ServiceStatus;
use crate::core::identity::EntityId;

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
pub fn format_short_id(id: &EntityId) -> String {
    format_short_id_str(&id.to_string())
}

/// Same as [`format_short_id`] for a plain string
pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 16 {
        let head: String = id.chars().take(13).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Status coloured for terminal output
pub fn styled_status(status: ServiceStatus) -> console::StyledObject<&'static str> {
    match status {
        ServiceStatus::Valid => style(status.as_str()).green(),
        ServiceStatus::Upcoming => style(status.as_str()).yellow(),
        ServiceStatus::Expired => style(status.as_str()).red(),
    }
}

/// "in 12 days", "today", "3 days ago"
pub fn describe_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {} days", d),
        d => format!("{} days ago", -d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Svc);
        let formatted = format_short_id(&id);
        assert_eq!(formatted.len(), 16);
        assert!(formatted.starts_with("SVC-"));
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_format_short_id_str() {
        assert_eq!(format_short_id_str("SHORT"), "SHORT");
        assert_eq!(
            format_short_id_str("SVC-01J123456789ABCDEF123456"),
            "SVC-01J123456..."
        );
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("Grüße aus Köln", 8), "Grüße...");
    }

    #[test]
    fn test_describe_days() {
        assert_eq!(describe_days(0), "today");
        assert_eq!(describe_days(30), "in 30 days");
        assert_eq!(describe_days(-4), "4 days ago");
    }
}
