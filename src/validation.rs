use time::{macros::format_description, Date};

/// True for a real `YYYY-MM-DD` calendar date.
pub fn is_calendar_date(s: &str) -> bool {
    Date::parse(s, format_description!("[year]-[month]-[day]")).is_ok()
}

/// Trimmed value, or `None` when blank.
pub fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
