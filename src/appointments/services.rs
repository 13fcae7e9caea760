use super::repo_types::AppointmentStatus;

pub const DEFAULT_REASON: &str = "No message provided";

/// Submitted reason exactly as sent, or the placeholder when it is missing
/// or blank.
pub fn reason_or_default(reason: Option<&str>) -> String {
    match reason {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => DEFAULT_REASON.to_string(),
    }
}

/// Maps an admin action to the status it sets. Anything else is a no-op.
pub fn status_for_action(action: &str) -> Option<AppointmentStatus> {
    match action.trim().to_ascii_lowercase().as_str() {
        "confirm" | "confirmed" => Some(AppointmentStatus::Confirmed),
        "decline" | "declined" => Some(AppointmentStatus::Declined),
        _ => None,
    }
}
