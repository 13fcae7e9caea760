use serde::{Deserialize, Serialize};

use crate::clinic::{Department, Doctor, TimeSlot};

/// Booking form. Patient details are filed separately through `/add_patient`.
#[derive(Debug, Deserialize)]
pub struct BookForm {
    pub doctor: i64,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManageForm {
    pub appointment_id: i64,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub departments: Vec<Department>,
    pub doctors: Vec<Doctor>,
    pub available_slots: Vec<TimeSlot>,
}
