use serde::{Deserialize, Serialize};

use super::repo_types::{Department, NewDoctor, TimeSlot};
use crate::validation::non_blank;

pub const SUGGESTED_TIMES: [&str; 17] = [
    "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM", "11:00 AM", "11:30 AM", "12:00 PM",
    "12:30 PM", "01:00 PM", "01:30 PM", "02:00 PM", "02:30 PM", "03:00 PM", "03:30 PM",
    "04:00 PM", "04:30 PM", "05:00 PM",
];

#[derive(Debug, Serialize)]
pub struct AdminSetupView {
    pub suggested_times: &'static [&'static str],
    pub departments: Vec<Department>,
    pub time_slots: Vec<TimeSlot>,
}

/// One admin-setup submission. Each part is present only when its fields
/// were submitted non-blank. The `time_slots_select` marker requests a slot
/// replacement even when no slot is ticked, which clears the set.
#[derive(Debug, Default, PartialEq)]
pub struct AdminSetupForm {
    pub department_name: Option<String>,
    pub doctor: Option<NewDoctor>,
    pub time_slots: Option<Vec<String>>,
}

impl AdminSetupForm {
    /// Built from raw pairs because `time_slots` repeats.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut department_name = None;
        let (mut name, mut specialty, mut contact) = (None, None, None);
        let mut slots: Vec<String> = Vec::new();
        let mut slots_selected = false;

        for (key, value) in pairs {
            match key.as_str() {
                "department_name" => department_name = non_blank(&value),
                "doctor_name" => name = non_blank(&value),
                "specialty" => specialty = non_blank(&value),
                "contact" => contact = non_blank(&value),
                "time_slots_select" => slots_selected = true,
                "time_slots" | "time_slots[]" => {
                    if let Some(slot) = non_blank(&value) {
                        if !slots.contains(&slot) {
                            slots.push(slot);
                        }
                    }
                }
                _ => {}
            }
        }

        let doctor = match (name, specialty, contact) {
            (Some(name), Some(specialty), Some(contact)) => Some(NewDoctor {
                name,
                specialty,
                contact,
            }),
            _ => None,
        };

        Self {
            department_name,
            doctor,
            time_slots: (slots_selected || !slots.is_empty()).then_some(slots),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPatientForm {
    pub name: String,
    pub dob: String,
    pub age: i64,
    pub gender: String,
    pub contact: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_submission_does_nothing() {
        assert_eq!(AdminSetupForm::from_pairs(vec![]), AdminSetupForm::default());
        let form = AdminSetupForm::from_pairs(pairs(&[
            ("department_name", "   "),
            ("doctor_name", ""),
            ("time_slots", " "),
        ]));
        assert_eq!(form, AdminSetupForm::default());
    }

    #[test]
    fn independent_parts() {
        let form = AdminSetupForm::from_pairs(pairs(&[
            ("department_name", " Cardiology "),
            ("doctor_name", "Dr. Who"),
            ("specialty", ""),
            ("contact", "x"),
        ]));
        assert_eq!(form.department_name.as_deref(), Some("Cardiology"));
        assert!(form.doctor.is_none(), "doctor needs all three fields");
        assert!(form.time_slots.is_none());
    }

    #[test]
    fn repeated_slots_are_collected_once() {
        let form = AdminSetupForm::from_pairs(pairs(&[
            ("time_slots", "09:00 AM"),
            ("time_slots", "10:00 AM"),
            ("time_slots", "09:00 AM"),
        ]));
        assert_eq!(
            form.time_slots,
            Some(vec!["09:00 AM".to_string(), "10:00 AM".to_string()])
        );
    }

    #[test]
    fn marker_without_slots_means_clear() {
        let form = AdminSetupForm::from_pairs(pairs(&[("time_slots_select", "1")]));
        assert_eq!(form.time_slots, Some(vec![]));
    }

    #[test]
    fn suggested_times_step_half_hours() {
        assert_eq!(SUGGESTED_TIMES.first(), Some(&"09:00 AM"));
        assert_eq!(SUGGESTED_TIMES.last(), Some(&"05:00 PM"));
    }
}
